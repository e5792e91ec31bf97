// JUnit reporter - outputs the run in JUnit XML format

use super::Reporter;
use crate::report::model::{Report, Status, Throwable};
use crate::state::TestCaseResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// JUnit reporter
pub struct JunitReporter {
    output_path: PathBuf,
}

impl JunitReporter {
    /// Create new JUnit reporter
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn seconds(millis: u64) -> String {
    format!("{:.3}", millis as f64 / 1000.0)
}

fn failure_body(throwable: &Throwable) -> String {
    let mut body = String::new();
    let mut current = Some(throwable);
    let mut first = true;
    while let Some(t) = current {
        if !first {
            body.push_str("Caused by: ");
        }
        first = false;
        body.push_str(&t.clazz.fully_qualified_name);
        if let Some(message) = &t.message {
            body.push_str(": ");
            body.push_str(message);
        }
        body.push('\n');
        for frame in &t.stack_trace {
            body.push_str("\tat ");
            body.push_str(frame);
            body.push('\n');
        }
        current = t.cause.as_deref();
    }
    body
}

/// Render the whole report as a `<testsuites>` document
pub fn render(report: &Report) -> String {
    let summary = &report.index.summary;
    let total_ms: u64 = report.test_cases.iter().map(|c| c.timings.total).sum();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuites name=\"flowbdd\" time=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\" timestamp=\"{}\">\n",
        seconds(total_ms),
        summary.tests,
        summary.failed,
        summary.aborted,
        summary.skipped,
        escape(&report.index.time_stamp)
    ));

    for suite in &report.test_suites {
        let suite_ms: u64 = suite.test_cases.iter().map(|c| c.timings.total).sum();
        xml.push_str(&format!(
            "  <testsuite name=\"{}\" time=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"{}\" skipped=\"{}\">\n",
            escape(&suite.name),
            seconds(suite_ms),
            suite.summary.tests,
            suite.summary.failed,
            suite.summary.aborted,
            suite.summary.skipped
        ));

        for case in &suite.test_cases {
            let name = case
                .method
                .as_ref()
                .map(|m| m.wordify.as_str())
                .filter(|w| !w.is_empty())
                .unwrap_or(&case.wordify);

            xml.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"{}\" time=\"{}\">\n",
                escape(name),
                escape(&case.clazz.fully_qualified_name),
                seconds(case.timings.total)
            ));

            match case.status {
                Status::Failed => {
                    if let Some(cause) = &case.cause {
                        let message = cause.message.as_deref().unwrap_or("Test failed");
                        xml.push_str(&format!(
                            "      <failure message=\"{}\" type=\"{}\">{}</failure>\n",
                            escape(message),
                            escape(&cause.clazz.fully_qualified_name),
                            escape(&failure_body(cause))
                        ));
                    }
                }
                Status::Aborted => {
                    xml.push_str("      <error message=\"Test aborted\" type=\"aborted\" />\n");
                }
                Status::Skipped => {
                    xml.push_str("      <skipped message=\"Test disabled\" />\n");
                }
                Status::Passed => {}
            }

            if let Some(notes) = &case.notes
                && !notes.notes.is_empty()
            {
                xml.push_str(&format!(
                    "      <system-out>{}</system-out>\n",
                    escape(&notes.notes.join("\n"))
                ));
            }

            xml.push_str("    </testcase>\n");
        }

        xml.push_str("  </testsuite>\n");
    }

    xml.push_str("</testsuites>\n");
    xml
}

impl Reporter for JunitReporter {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn on_case_finished(&self, _result: &TestCaseResult) {
        // No-op for JUnit file reporter
    }

    fn on_run_finished(&self, report: &Report) -> Result<()> {
        if let Some(parent) = self.output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create JUnit report directory: {}", parent.display())
            })?;
        }

        fs::write(&self.output_path, render(report)).with_context(|| {
            format!(
                "Failed to write JUnit report file: {}",
                self.output_path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_failure_body_walks_chain() {
        let t = Throwable::new("java.lang.IllegalStateException", Some("outer".into()))
            .with_stack_trace(["Dev.spill(Dev.java:10)"])
            .with_cause(Throwable::new("java.io.IOException", Some("inner".into())));
        let body = failure_body(&t);
        assert!(body.starts_with("java.lang.IllegalStateException: outer\n"));
        assert!(body.contains("\tat Dev.spill(Dev.java:10)\n"));
        assert!(body.contains("Caused by: java.io.IOException: inner"));
    }

    #[test]
    fn test_seconds_format() {
        assert_eq!(seconds(1500), "1.500");
        assert_eq!(seconds(0), "0.000");
    }
}
