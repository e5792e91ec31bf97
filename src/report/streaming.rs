// Streaming JSON reporter - one NDJSON event per line on stdout

use crate::report::model::{Report, Status};
use crate::state::TestCaseResult;
use anyhow::Result;
use serde_json::json;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use super::Reporter;

pub struct StreamingJsonReporter {
    run_started: AtomicBool,
}

impl StreamingJsonReporter {
    pub fn new() -> Self {
        Self {
            run_started: AtomicBool::new(false),
        }
    }

    fn emit(&self, event: &serde_json::Value) {
        let mut stdout = io::stdout().lock();
        if let Ok(s) = serde_json::to_string(event) {
            let _ = writeln!(stdout, "{}", s);
        }
        let _ = stdout.flush();
    }
}

impl Default for StreamingJsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Event for one finished case
pub fn case_event(result: &TestCaseResult) -> serde_json::Value {
    let event_type = match result.status() {
        Status::Passed => "test_pass",
        Status::Failed => "test_fail",
        Status::Aborted => "test_abort",
        Status::Skipped => "test_skip",
    };

    let mut event = json!({
        "event": event_type,
        "suite": result.clazz().fully_qualified_name,
        "testId": result.wordify(),
        "duration": result.timings().total,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    if let Some(cause) = result.cause() {
        event["exception"] = json!(cause.clazz.fully_qualified_name);
        if let Some(msg) = &cause.message {
            event["message"] = json!(msg);
        }
    }

    event
}

impl Reporter for StreamingJsonReporter {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn on_case_finished(&self, result: &TestCaseResult) {
        if !self.run_started.swap(true, Ordering::SeqCst) {
            self.emit(&json!({
                "event": "run_start",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }));
        }

        self.emit(&case_event(result));
    }

    fn on_run_finished(&self, report: &Report) -> Result<()> {
        self.emit(&json!({
            "event": "run_end",
            "summary": report.index.summary,
            "suites": report.test_suites.len(),
            "timestamp": report.time_stamp
        }));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{Clazz, Throwable};

    #[test]
    fn test_case_event_for_failure() {
        let result = TestCaseResult::failed(
            Clazz::from_fully_qualified("com.example.Dev"),
            "spills coffee",
            Throwable::new("java.lang.IllegalStateException", Some("cup full".into())),
        );
        let event = case_event(&result);
        assert_eq!(event["event"], "test_fail");
        assert_eq!(event["suite"], "com.example.Dev");
        assert_eq!(event["exception"], "java.lang.IllegalStateException");
        assert_eq!(event["message"], "cup full");
    }

    #[test]
    fn test_case_event_for_skip_has_no_exception() {
        let result =
            TestCaseResult::skipped(Clazz::from_fully_qualified("com.example.Dev"), "naps");
        let event = case_event(&result);
        assert_eq!(event["event"], "test_skip");
        assert!(event.get("exception").is_none());
    }
}
