// State module - in-memory accumulation of test results
// Results stream in per class and stay here until a report is assembled

pub mod accumulator;
pub mod context;
pub mod notes;
pub mod result;

pub use accumulator::{SuiteAccumulator, SuiteSnapshot, Totals};
pub use context::RunContext;
pub use notes::{Diagram, Notes};
pub use result::TestCaseResult;

pub use crate::report::model::Status;
