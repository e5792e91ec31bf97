// Markdown reporter - human-readable index and per-suite pages

use super::Reporter;
use crate::report::model::{Report, ReportNotes, Status, Summary, TestCase, TestSuite, Throwable};
use crate::state::TestCaseResult;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Markdown reporter
pub struct MarkdownReporter {
    output_dir: PathBuf,
}

impl MarkdownReporter {
    /// Create new Markdown reporter writing into `output_dir`
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn suite_file_name(suite: &TestSuite) -> String {
        format!("TEST-{}.md", suite.name)
    }
}

impl Reporter for MarkdownReporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn on_case_finished(&self, _result: &TestCaseResult) {
        // Pages are rendered from the assembled report
    }

    fn on_run_finished(&self, report: &Report) -> Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create Markdown report directory: {}",
                self.output_dir.display()
            )
        })?;

        let index_path = self.output_dir.join("index.md");
        fs::write(&index_path, render_index(report))
            .with_context(|| format!("Failed to write {}", index_path.display()))?;

        for suite in &report.test_suites {
            let path = self.output_dir.join(Self::suite_file_name(suite));
            fs::write(&path, render_suite(suite))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        Ok(())
    }
}

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Passed => "✅",
        Status::Failed => "❌",
        Status::Skipped => "⏭️",
        Status::Aborted => "⚠️",
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn summary_table(out: &mut String, summary: &Summary) {
    out.push_str("| Tests | Passed | Failed | Aborted | Skipped |\n");
    out.push_str("|---:|---:|---:|---:|---:|\n");
    let _ = writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        summary.tests, summary.passed, summary.failed, summary.aborted, summary.skipped
    );
}

/// Render the run overview
pub fn render_index(report: &Report) -> String {
    let mut out = String::from("# Test report\n\n");
    let _ = write!(out, "Generated {}", report.index.time_stamp);
    if let Some(version) = &report.index.version {
        let _ = write!(out, " by flowbdd {}", version);
    }
    out.push_str("\n\n");
    summary_table(&mut out, &report.index.summary);

    out.push_str("\n## Suites\n\n");
    if report.test_suites.is_empty() {
        out.push_str("_No suites were recorded._\n");
        return out;
    }

    out.push_str("| Suite | Tests | Passed | Failed | Aborted | Skipped |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|\n");
    for suite in &report.test_suites {
        let s = &suite.summary;
        let _ = writeln!(
            out,
            "| [{}]({}) | {} | {} | {} | {} | {} |",
            cell(&suite.title),
            MarkdownReporter::suite_file_name(suite),
            s.tests,
            s.passed,
            s.failed,
            s.aborted,
            s.skipped
        );
    }
    out
}

/// Render one suite page
pub fn render_suite(suite: &TestSuite) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", suite.title);
    let _ = writeln!(out, "`{}`\n", suite.name);
    summary_table(&mut out, &suite.summary);

    if let Some(notes) = &suite.notes {
        out.push_str("\n## Notes\n\n");
        render_notes(&mut out, notes);
    }

    out.push_str("\n## Test cases\n");
    if suite.test_cases.is_empty() {
        out.push_str("\n_No test cases completed._\n");
    }
    for case in &suite.test_cases {
        render_case(&mut out, case);
    }
    out
}

fn render_case(out: &mut String, case: &TestCase) {
    let _ = writeln!(out, "\n### {} {}\n", status_icon(case.status), case.wordify);
    let _ = writeln!(out, "- Status: {}", case.status.as_str());

    if let Some(method) = &case.method {
        let args: Vec<String> = method
            .arguments
            .iter()
            .map(|arg| match arg {
                Some(arg) => format!("{} {}", arg.clazz.class_name, arg.value),
                None => "null".to_string(),
            })
            .collect();
        let _ = writeln!(out, "- Method: `{}({})`", method.name, args.join(", "));
    }

    if case.timings.total > 0 {
        let _ = writeln!(out, "- Duration: {} ms", case.timings.total);
    }

    if let Some(cause) = &case.cause {
        out.push_str("\n```text\n");
        render_throwable(out, cause, 0);
        out.push_str("```\n");
    }

    if let Some(notes) = &case.notes {
        out.push('\n');
        render_notes(out, notes);
    }
}

fn render_throwable(out: &mut String, throwable: &Throwable, depth: usize) {
    if depth > 0 {
        out.push_str("Caused by: ");
    }
    let _ = write!(out, "{}", throwable.clazz.fully_qualified_name);
    if let Some(message) = &throwable.message {
        let _ = write!(out, ": {}", message);
    }
    out.push('\n');
    for frame in &throwable.stack_trace {
        let _ = writeln!(out, "    at {}", frame);
    }
    if let Some(cause) = &throwable.cause {
        render_throwable(out, cause, depth + 1);
    }
}

fn render_notes(out: &mut String, notes: &ReportNotes) {
    for line in &notes.notes {
        let _ = writeln!(out, "> {}", line);
    }
    for diagram in &notes.diagrams {
        let _ = writeln!(out, "\n```mermaid\n{}\n```", diagram.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{Clazz, Method};

    fn suite_with(case: TestCase) -> TestSuite {
        TestSuite {
            title: "Dev".into(),
            name: "com.example.Dev".into(),
            class_name: "Dev".into(),
            package_name: "com.example".into(),
            test_cases: vec![case],
            summary: Summary {
                tests: 1,
                failed: 1,
                ..Summary::default()
            },
            notes: Some(ReportNotes {
                notes: vec!["Kettle is shared".into()],
                diagrams: vec!["sequenceDiagram\nDev->>Kettle: boil".into()],
            }),
        }
    }

    fn failing_case() -> TestCase {
        TestCase {
            wordify: "Spills coffee".into(),
            status: Status::Failed,
            cause: Some(
                Throwable::new("java.lang.IllegalStateException", Some("cup full".into()))
                    .with_cause(Throwable::new("java.lang.NullPointerException", None)),
            ),
            method: Some(Method::new("spillsCoffee", "Spills coffee").with_null_argument()),
            clazz: Clazz::from_fully_qualified("com.example.Dev"),
            notes: None,
            timings: Default::default(),
        }
    }

    #[test]
    fn test_render_suite_includes_cause_chain() {
        let page = render_suite(&suite_with(failing_case()));
        assert!(page.contains("# Dev"));
        assert!(page.contains("java.lang.IllegalStateException: cup full"));
        assert!(page.contains("Caused by: java.lang.NullPointerException"));
        assert!(page.contains("`spillsCoffee(null)`"));
    }

    #[test]
    fn test_render_suite_notes_and_diagrams() {
        let page = render_suite(&suite_with(failing_case()));
        assert!(page.contains("> Kettle is shared"));
        assert!(page.contains("```mermaid\nsequenceDiagram"));
    }

    #[test]
    fn test_cell_escapes_pipes() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
