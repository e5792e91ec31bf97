// Per-class accumulation of test case results

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::trace;

use crate::error::ReportError;
use crate::report::model::{Clazz, Status, Summary};
use crate::state::{Diagram, Notes, TestCaseResult};

/// Running totals for one suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub count: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
}

impl Totals {
    pub fn increment(&mut self, status: Status) {
        self.count += 1;
        match status {
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
            Status::Aborted => self.aborted += 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.count == self.passed + self.failed + self.skipped + self.aborted
    }

    pub fn to_summary(&self) -> Summary {
        Summary {
            tests: self.count,
            passed: self.passed,
            failed: self.failed,
            aborted: self.aborted,
            skipped: self.skipped,
        }
    }
}

/// Everything an accumulator holds, copied out under one lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSnapshot {
    pub clazz: Clazz,
    pub title: Option<String>,
    pub cases: Vec<TestCaseResult>,
    pub notes: Notes,
    pub totals: Totals,
}

#[derive(Debug, Default)]
struct SuiteState {
    title: Option<String>,
    cases: Vec<TestCaseResult>,
    notes: Notes,
    totals: Totals,
}

/// Collects results for one test class.
///
/// Sibling worker threads record into the same accumulator; every mutation
/// and every read happens under a single lock, so totals never expose a
/// half-applied increment.
#[derive(Debug)]
pub struct SuiteAccumulator {
    clazz: Clazz,
    state: Mutex<SuiteState>,
}

impl SuiteAccumulator {
    pub fn new(clazz: Clazz) -> Self {
        Self {
            clazz,
            state: Mutex::new(SuiteState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SuiteState> {
        // A panicking recorder cannot leave SuiteState half-updated: push and
        // increment happen after all fallible work.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clazz(&self) -> &Clazz {
        &self.clazz
    }

    /// Append a result and bump the totals.
    ///
    /// The result must belong to this accumulator's class; see
    /// [`SuiteAccumulator::try_record`] for a checked variant.
    pub fn record(&self, result: TestCaseResult) {
        debug_assert_eq!(
            result.clazz().fully_qualified_name,
            self.clazz.fully_qualified_name,
            "test case recorded into another class's suite"
        );
        let status = result.status();
        let mut state = self.lock();
        state.cases.push(result);
        state.totals.increment(status);
        trace!(
            class = %self.clazz.fully_qualified_name,
            status = status.as_str(),
            count = state.totals.count,
            "recorded test case"
        );
    }

    /// Like [`SuiteAccumulator::record`], rejecting a result of another class
    pub fn try_record(&self, result: TestCaseResult) -> Result<(), ReportError> {
        if result.clazz().fully_qualified_name != self.clazz.fully_qualified_name {
            return Err(ReportError::validation(format!(
                "test case '{}' of {} cannot be recorded into suite {}",
                result.wordify(),
                result.clazz().fully_qualified_name,
                self.clazz.fully_qualified_name
            )));
        }
        self.record(result);
        Ok(())
    }

    pub fn totals(&self) -> Totals {
        self.lock().totals
    }

    pub fn len(&self) -> usize {
        self.lock().cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = Some(title.into());
    }

    /// Suite-level note shared by all cases of the class
    pub fn add_note(&self, line: impl Into<String>) {
        self.lock().notes.add_text(line);
    }

    pub fn add_diagram<D: Diagram + ?Sized>(&self, diagram: &D) {
        self.lock().notes.add_diagram(diagram);
    }

    pub fn snapshot(&self) -> SuiteSnapshot {
        let state = self.lock();
        SuiteSnapshot {
            clazz: self.clazz.clone(),
            title: state.title.clone(),
            cases: state.cases.clone(),
            notes: state.notes.clone(),
            totals: state.totals,
        }
    }

    /// Forget everything; the next `record` behaves as first use
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = SuiteState::default();
    }
}
