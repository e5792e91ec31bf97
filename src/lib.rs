pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod report;
pub mod state;
pub mod time;

pub use error::{ErrorKind, ReportError};
pub use listener::{EngineEvent, EngineOutcome, ExecutionListener, Handled, Phase, TestIdentifier};
