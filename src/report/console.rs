// Console reporter - progress while results stream in, summary at the end

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::cli::ProgressMode;
use crate::report::model::{Report, Status};
use crate::state::TestCaseResult;
use console::style;
use indicatif::ProgressBar;

const DOTS_PER_LINE: usize = 80;
const RULE: &str =
    "════════════════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";

/// Console reporter
pub struct ConsoleReporter {
    mode: ProgressMode,
    progress_bar: ProgressBar,
    dots_lock: Mutex<()>,
    dots_count: AtomicUsize,
}

impl ConsoleReporter {
    /// Create new console reporter; `expected` sizes the progress bar when known
    pub fn new(mode: ProgressMode, expected: Option<u64>) -> Self {
        let progress_bar = match (mode, expected) {
            (ProgressMode::Bar, Some(total)) => ProgressBar::new(total),
            (ProgressMode::Bar, None) => ProgressBar::new_spinner(),
            _ => ProgressBar::hidden(),
        };

        Self {
            mode,
            progress_bar,
            dots_lock: Mutex::new(()),
            dots_count: AtomicUsize::new(0),
        }
    }

    fn status_char(status: Status) -> String {
        match status {
            Status::Passed => style(".").green().to_string(),
            Status::Failed => style("F").red().to_string(),
            Status::Aborted => style("A").yellow().to_string(),
            Status::Skipped => style("S").dim().to_string(),
        }
    }

    fn print_dot(&self, status: Status) {
        let _guard = self.dots_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}", Self::status_char(status));
        let _ = stdout.flush();

        let count = self.dots_count.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= DOTS_PER_LINE {
            let _ = writeln!(stdout);
            self.dots_count.store(0, Ordering::Relaxed);
        }
    }

    /// Print summary
    pub fn print_summary(&self, report: &Report) {
        self.progress_bar.finish_and_clear();

        let summary = &report.index.summary;
        let total_ms: u64 = report.test_cases.iter().map(|c| c.timings.total).sum();

        println!();
        println!("{}", RULE);
        if summary.failed > 0 || summary.aborted > 0 {
            println!(
                "{} ({} failed, {} aborted, {} passed)",
                style("❌ FAILED").red().bold(),
                summary.failed,
                summary.aborted,
                summary.passed
            );
        } else {
            println!(
                "{} ({} passed)",
                style("✅ PASSED").green().bold(),
                summary.passed
            );
        }
        println!("{}", THIN_RULE);
        println!("📊 Run Statistics:");
        println!("   • Suites: {}", report.test_suites.len());
        println!("   • Total tests: {}", summary.tests);
        println!("   • Passed: {}", summary.passed);
        println!("   • Failed: {}", summary.failed);
        println!("   • Aborted: {}", summary.aborted);
        println!("   • Skipped: {}", summary.skipped);
        if total_ms > 0 {
            println!("   • Recorded duration: {}ms", total_ms);
        }

        let executed = summary.passed + summary.failed;
        if executed > 0 {
            let success_rate = (summary.passed as f64 / executed as f64) * 100.0;
            println!(
                "   • Success rate: {:.0}% ({}/{} executed)",
                success_rate, summary.passed, executed
            );
        } else {
            println!("   • Success rate: N/A (no tests executed)");
        }
        println!("{}", THIN_RULE);

        let failures: Vec<_> = report
            .test_cases
            .iter()
            .filter(|c| matches!(c.status, Status::Failed | Status::Aborted))
            .collect();
        if !failures.is_empty() {
            println!("❌ Failed Tests:");
            for case in failures {
                println!(
                    "   • {} › {}",
                    case.clazz.class_name,
                    style(&case.wordify).bold()
                );
                if let Some(cause) = &case.cause {
                    match &cause.message {
                        Some(message) => println!(
                            "      Error: {}: {}",
                            cause.clazz.class_name, message
                        ),
                        None => println!("      Error: {}", cause.clazz.class_name),
                    }
                }
            }
        }

        println!("{}", RULE);
        println!();
    }
}

impl super::Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn on_case_finished(&self, result: &TestCaseResult) {
        match self.mode {
            ProgressMode::Dots => self.print_dot(result.status()),
            ProgressMode::Bar => {
                self.progress_bar.inc(1);
                self.progress_bar.set_message(result.wordify().to_string());
            }
            ProgressMode::Verbose => {
                let outcome = match result.status() {
                    Status::Passed => style("PASS").green(),
                    Status::Failed => style("FAIL").red(),
                    Status::Aborted => style("ABORT").yellow(),
                    Status::Skipped => style("SKIP").dim(),
                };
                println!(
                    "{} {} › {}",
                    outcome,
                    result.clazz().class_name,
                    result.wordify()
                );
            }
            ProgressMode::None => {}
        }
    }

    fn on_run_finished(&self, report: &Report) -> anyhow::Result<()> {
        if matches!(self.mode, ProgressMode::Dots) && self.dots_count.load(Ordering::Relaxed) > 0 {
            println!();
        }

        if !matches!(self.mode, ProgressMode::None) {
            self.print_summary(report);
        }
        Ok(())
    }
}
