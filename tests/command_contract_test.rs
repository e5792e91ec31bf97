use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn get_binary() -> String {
    env!("CARGO_BIN_EXE_flowbdd").to_string()
}

const EVENTS: &str = r#"
{"event":"runStarted","runId":"morning"}
{"event":"suiteStarted","clazz":"com.example.Dev","title":"Developer mornings"}
{"event":"caseFinished","id":{"uniqueId":"[engine:junit-jupiter]/[class:com.example.Dev]/[method:drinksCoffee()]","displayName":"drinks coffee"},"outcome":{"status":"successful"}}
{"event":"caseFinished","id":{"uniqueId":"[engine:junit-jupiter]/[class:com.example.Dev]/[method:eatsToast()]","displayName":"eats toast"},"outcome":{"status":"skipped","reason":"no bread"}}
{"event":"suiteStarted","clazz":"com.example.Idle"}
{"event":"runFinished","runId":"morning"}
{"event":"runFinished","runId":"morning"}
"#;

const FAILING_EVENTS: &str = r#"
{"event":"caseFinished","id":{"uniqueId":"[class:com.example.Dev]","displayName":"spills coffee"},"outcome":{"status":"failed","cause":{"clazz":{"fullyQualifiedName":"java.lang.NullPointerException","className":"NullPointerException","packageName":"java.lang"},"message":"cup","cause":null}}}
"#;

fn run(base: &Path, args: &[&str]) -> Output {
    Command::new(get_binary())
        .arg("--base-dir")
        .arg(base)
        .args(args)
        .env_remove("FLOWBDD_BASE_DIR")
        .output()
        .expect("Failed to execute flowbdd")
}

fn ingest(temp: &TempDir, events: &str, extra: &[&str]) -> Output {
    let events_file = temp.path().join("events.ndjson");
    fs::write(&events_file, events).expect("write events");
    let events_arg = events_file.to_string_lossy().to_string();

    let mut args = vec!["ingest", events_arg.as_str(), "--progress", "none", "-p", "1"];
    args.extend_from_slice(extra);
    run(&temp.path().join("out"), &args)
}

#[test]
fn test_ingest_writes_data_files() {
    let temp = TempDir::new().expect("temp dir");
    let output = ingest(&temp, EVENTS, &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let data = temp.path().join("out").join("data");
    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data.join("index.json")).unwrap()).unwrap();
    assert_eq!(index["summary"]["tests"], 2);
    assert_eq!(index["summary"]["passed"], 1);
    assert_eq!(index["summary"]["skipped"], 1);
    assert_eq!(index["links"]["testSuites"].as_array().unwrap().len(), 2);
    assert!(data.join("TEST-com.example.Dev.json").is_file());
    assert!(data.join("TEST-com.example.Idle.json").is_file());
}

#[test]
fn test_ingest_renders_requested_formats() {
    let temp = TempDir::new().expect("temp dir");
    let output = ingest(&temp, EVENTS, &["--format", "markdown,junit"]);
    assert!(output.status.success());

    let report = temp.path().join("out").join("report");
    assert!(report.join("index.md").is_file());
    assert!(report.join("TEST-com.example.Dev.md").is_file());
    assert!(report.join("junit.xml").is_file());
}

#[test]
fn test_ingest_stream_outputs_ndjson() {
    let temp = TempDir::new().expect("temp dir");
    let output = ingest(&temp, EVENTS, &["--stream"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect();
    assert_eq!(events.first().unwrap()["event"], "run_start");
    assert_eq!(events.last().unwrap()["event"], "run_end");
    assert_eq!(events.last().unwrap()["summary"]["tests"], 2);
}

#[test]
fn test_ingest_with_failures_exits_non_zero() {
    let temp = TempDir::new().expect("temp dir");
    let output = ingest(&temp, FAILING_EVENTS, &[]);
    assert!(!output.status.success());

    // Run finished implicitly at end of stream
    let data = temp.path().join("out").join("data");
    assert!(data.join("TEST-com.example.Dev.json").is_file());
}

#[test]
fn test_show_commands_json_output() {
    let temp = TempDir::new().expect("temp dir");
    assert!(ingest(&temp, EVENTS, &[]).status.success());
    let base = temp.path().join("out");

    let output = run(&base, &["index", "--format", "json"]);
    let index: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
    assert_eq!(index["summary"]["tests"], 2);

    let output = run(&base, &["suites", "--format", "json"]);
    let suites: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
    assert_eq!(suites[0]["name"], "com.example.Dev");

    let output = run(&base, &["suite", "com.example.Dev", "--format", "json"]);
    let suite: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
    assert_eq!(suite["title"], "Developer mornings");
    assert_eq!(suite["testCases"].as_array().unwrap().len(), 2);
}

#[test]
fn test_suite_unknown_name_fails() {
    let temp = TempDir::new().expect("temp dir");
    assert!(ingest(&temp, EVENTS, &[]).status.success());

    let output = run(&temp.path().join("out"), &["suite", "com.example.Ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_verify_detects_missing_suite_file() {
    let temp = TempDir::new().expect("temp dir");
    assert!(ingest(&temp, EVENTS, &[]).status.success());
    let base = temp.path().join("out");

    assert!(run(&base, &["verify"]).status.success());

    fs::remove_file(base.join("data").join("TEST-com.example.Idle.json")).unwrap();
    let output = run(&base, &["verify", "--format", "json"]);
    assert!(!output.status.success());
    let consistency: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON output");
    assert_eq!(consistency["missing"][0], "TEST-com.example.Idle.json");
}

#[test]
fn test_render_from_persisted_data() {
    let temp = TempDir::new().expect("temp dir");
    assert!(ingest(&temp, EVENTS, &[]).status.success());
    let base = temp.path().join("out");
    let rendered = temp.path().join("rendered");

    let output = run(
        &base,
        &[
            "render",
            "--format",
            "junit",
            "--output",
            rendered.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(rendered.join("junit.xml").is_file());
}
