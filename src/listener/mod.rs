// Execution listener - turns engine events into accumulated results and a persisted report

pub mod events;

pub use events::{EngineEvent, EngineOutcome, TestIdentifier, class_from_unique_id};

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ReportError;
use crate::report::model::{Clazz, Report, Status, Summary, VersionInfo, validate_class_name};
use crate::report::{DataReportWriter, ReportAssembler, Reporter};
use crate::state::{Notes, RunContext, TestCaseResult};
use crate::time::{Clock, SystemClock};

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating,
    Persisted,
    WriteFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Accumulating => "accumulating",
            Phase::Persisted => "persisted",
            Phase::WriteFailed => "write-failed",
        };
        f.write_str(name)
    }
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    RunStarted(String),
    SuiteRegistered(String),
    CaseRecorded(Status),
    Persisted(Summary),
    Duplicate,
}

#[derive(Debug)]
struct RunState {
    phase: Phase,
    run_id: Option<String>,
    finished: HashSet<String>,
}

impl RunState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            run_id: None,
            finished: HashSet::new(),
        }
    }

    fn start(&mut self, run_id: Option<String>) -> String {
        let run_id = run_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.phase = Phase::Accumulating;
        self.run_id = Some(run_id.clone());
        run_id
    }
}

/// Consumes engine events; shared across worker threads behind an `Arc`.
///
/// Cases are recorded under a shared phase lock, run completion takes it
/// exclusively, so nothing is recorded while a report is assembled.
pub struct ExecutionListener {
    context: RunContext,
    writer: DataReportWriter,
    reporters: Vec<Arc<dyn Reporter>>,
    clock: Arc<dyn Clock>,
    state: RwLock<RunState>,
}

impl ExecutionListener {
    pub fn new(writer: DataReportWriter) -> Self {
        Self {
            context: RunContext::new(),
            writer,
            reporters: Vec::new(),
            clock: Arc::new(SystemClock),
            state: RwLock::new(RunState::idle()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn writer(&self) -> &DataReportWriter {
        &self.writer
    }

    pub fn phase(&self) -> Phase {
        self.read_state().phase
    }

    pub fn run_id(&self) -> Option<String> {
        self.read_state().run_id.clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RunState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RunState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one event; safe to call from many threads at once
    pub fn handle(&self, event: EngineEvent) -> Result<Handled, ReportError> {
        match event {
            EngineEvent::RunStarted { run_id } => self.run_started(run_id),
            EngineEvent::SuiteStarted {
                clazz,
                title,
                notes,
            } => self.suite_started(&clazz, title, notes.map(Notes::from)),
            EngineEvent::CaseFinished { id, outcome } => self.case_finished(id, outcome),
            EngineEvent::RunFinished { run_id } => self.run_finished(run_id),
        }
    }

    fn rejected(phase: Phase, what: &str) -> ReportError {
        ReportError::validation(format!(
            "{} received after the run was {}; reset the listener first",
            what, phase
        ))
    }

    fn run_started(&self, run_id: Option<String>) -> Result<Handled, ReportError> {
        let mut state = self.write_state();
        match state.phase {
            Phase::Idle => {}
            Phase::Accumulating => {
                return Err(ReportError::validation(format!(
                    "run {} is already in progress",
                    state.run_id.as_deref().unwrap_or("?")
                )));
            }
            phase => return Err(Self::rejected(phase, "runStarted")),
        }
        if let Some(id) = &run_id
            && state.finished.contains(id)
        {
            return Err(ReportError::validation(format!(
                "run {} has already finished",
                id
            )));
        }

        let run_id = state.start(run_id);
        info!("Run {} started", run_id);
        Ok(Handled::RunStarted(run_id))
    }

    /// Shared guard on an accumulating run, starting an anonymous one from idle
    fn accumulating(&self, what: &str) -> Result<RwLockReadGuard<'_, RunState>, ReportError> {
        loop {
            {
                let state = self.read_state();
                let phase = state.phase;
                match phase {
                    Phase::Accumulating => return Ok(state),
                    Phase::Idle => {}
                    phase => return Err(Self::rejected(phase, what)),
                }
            }

            let mut state = self.write_state();
            if state.phase == Phase::Idle {
                let run_id = state.start(None);
                debug!("{} outside a run; started anonymous run {}", what, run_id);
            }
        }
    }

    fn suite_started(
        &self,
        clazz: &str,
        title: Option<String>,
        notes: Option<Notes>,
    ) -> Result<Handled, ReportError> {
        let clazz = clazz.trim();
        validate_class_name(clazz)?;
        let _state = self.accumulating("suiteStarted")?;

        let clazz = Clazz::from_fully_qualified(clazz);
        let accumulator = self.context.accumulator(&clazz);
        if let Some(title) = title {
            accumulator.set_title(title);
        }
        if let Some(notes) = notes {
            for line in notes.text() {
                accumulator.add_note(line.clone());
            }
            for diagram in notes.diagrams() {
                accumulator.add_diagram(diagram.as_str());
            }
        }

        debug!("Suite {} started", clazz.fully_qualified_name);
        Ok(Handled::SuiteRegistered(clazz.fully_qualified_name))
    }

    fn case_finished(
        &self,
        id: TestIdentifier,
        outcome: EngineOutcome,
    ) -> Result<Handled, ReportError> {
        let clazz = id.resolve_class()?;
        let status = outcome.status();
        let cause = match outcome {
            EngineOutcome::Failed { cause } => Some(cause),
            EngineOutcome::Aborted { reason } | EngineOutcome::Skipped { reason } => {
                if let Some(reason) = reason {
                    debug!("{} {}: {}", id.display_name, status.as_str(), reason);
                }
                None
            }
            EngineOutcome::Successful => None,
        };

        let mut result = TestCaseResult::new(clazz.clone(), id.display_name, status, cause)?
            .with_timings(id.timings);
        if let Some(method) = id.method {
            result = result.with_method(method);
        }
        if let Some(notes) = id.notes {
            result = result.with_notes(Notes::from(notes));
        }

        let _state = self.accumulating("caseFinished")?;
        for reporter in &self.reporters {
            reporter.on_case_finished(&result);
        }
        self.context.accumulator(&clazz).try_record(result)?;

        Ok(Handled::CaseRecorded(status))
    }

    fn run_finished(&self, run_id: Option<String>) -> Result<Handled, ReportError> {
        let mut state = self.write_state();

        let run_id = match (run_id, state.run_id.clone()) {
            (Some(id), _) => id,
            (None, Some(current)) => current,
            (None, None) => {
                return Err(ReportError::validation("runFinished without a run in progress"));
            }
        };

        if state.finished.contains(&run_id) {
            debug!("Ignoring duplicate runFinished for {}", run_id);
            return Ok(Handled::Duplicate);
        }

        match state.phase {
            Phase::Accumulating => {
                if let Some(current) = &state.run_id
                    && current != &run_id
                {
                    return Err(ReportError::validation(format!(
                        "runFinished for {} while run {} is in progress",
                        run_id, current
                    )));
                }
            }
            Phase::Idle => {
                state.start(Some(run_id.clone()));
            }
            phase => return Err(Self::rejected(phase, "runFinished")),
        }

        state.finished.insert(run_id.clone());
        match self.persist() {
            Ok(report) => {
                state.phase = Phase::Persisted;
                info!(
                    "Run {} persisted: {} tests in {} suites",
                    run_id,
                    report.index.summary.tests,
                    report.test_suites.len()
                );
                Ok(Handled::Persisted(report.index.summary))
            }
            Err(e) => {
                state.phase = Phase::WriteFailed;
                error!("Run {} could not be persisted: {}", run_id, e);
                Err(e)
            }
        }
    }

    fn persist(&self) -> Result<Report, ReportError> {
        let version = VersionInfo::create(self.clock.as_ref());
        let report = ReportAssembler::from_context(&self.context, &version);
        self.writer.write(&report)?;

        for reporter in &self.reporters {
            reporter
                .on_run_finished(&report)
                .map_err(|source| ReportError::Reporter {
                    name: reporter.name(),
                    source,
                })?;
        }
        Ok(report)
    }

    /// Write whatever has accumulated without finishing the run
    pub fn flush_partial(&self) -> Result<Report, ReportError> {
        let state = self.read_state();
        warn!(
            "Flushing partial report for run {} ({} suites, phase {})",
            state.run_id.as_deref().unwrap_or("-"),
            self.context.len(),
            state.phase
        );

        let version = VersionInfo::create(self.clock.as_ref());
        let report = ReportAssembler::from_context(&self.context, &version);
        self.writer.write(&report)?;
        Ok(report)
    }

    /// Forget the current run and its accumulators
    pub fn reset(&self) {
        let mut state = self.write_state();
        self.context.reset();
        state.phase = Phase::Idle;
        state.run_id = None;
        debug!("Listener reset");
    }
}
