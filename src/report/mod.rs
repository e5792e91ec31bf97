// Report module - report model, assembly, persistence and renderings

pub mod assembler;
pub mod console;
pub mod junit;
pub mod markdown;
pub mod model;
pub mod reader;
pub mod streaming;
pub mod writer;

use crate::state::TestCaseResult;
use anyhow::Result;
pub use assembler::ReportAssembler;
pub use console::ConsoleReporter;
pub use junit::JunitReporter;
pub use markdown::MarkdownReporter;
pub use model::{
    Argument, Clazz, DataReportIndex, Links, Method, Report, ReportNotes, Status, Summary,
    TestCase, TestSuite, TestSuiteNameToFile, Throwable, Timings, VersionInfo,
};
pub use reader::{Consistency, ReportReader};
pub use streaming::StreamingJsonReporter;
pub use writer::DataReportWriter;

/// Observer of a run, fed by the execution listener
pub trait Reporter: Send + Sync {
    /// Short name used in log and error messages
    fn name(&self) -> &'static str;

    /// Called for every recorded test case, possibly from several threads at once
    fn on_case_finished(&self, result: &TestCaseResult);

    /// Called once per run with the assembled report
    fn on_run_finished(&self, report: &Report) -> Result<()>;
}
