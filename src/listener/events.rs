// Engine lifecycle events consumed by the execution listener

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::report::model::{
    Clazz, Method, ReportNotes, Status, Throwable, Timings, validate_class_name,
};

/// One lifecycle signal from a test engine.
///
/// Serialized with an `event` tag so a run can be replayed from NDJSON:
/// `{"event":"caseFinished","id":{...},"outcome":{"status":"successful"}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineEvent {
    RunStarted {
        #[serde(default)]
        run_id: Option<String>,
    },
    SuiteStarted {
        clazz: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        notes: Option<ReportNotes>,
    },
    CaseFinished {
        id: TestIdentifier,
        outcome: EngineOutcome,
    },
    RunFinished {
        #[serde(default)]
        run_id: Option<String>,
    },
}

impl EngineEvent {
    pub fn run_started(run_id: impl Into<String>) -> Self {
        EngineEvent::RunStarted {
            run_id: Some(run_id.into()),
        }
    }

    pub fn suite_started(clazz: impl Into<String>) -> Self {
        EngineEvent::SuiteStarted {
            clazz: clazz.into(),
            title: None,
            notes: None,
        }
    }

    pub fn case_finished(id: TestIdentifier, outcome: EngineOutcome) -> Self {
        EngineEvent::CaseFinished { id, outcome }
    }

    pub fn run_finished(run_id: impl Into<String>) -> Self {
        EngineEvent::RunFinished {
            run_id: Some(run_id.into()),
        }
    }

    /// Tag name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::RunStarted { .. } => "runStarted",
            EngineEvent::SuiteStarted { .. } => "suiteStarted",
            EngineEvent::CaseFinished { .. } => "caseFinished",
            EngineEvent::RunFinished { .. } => "runFinished",
        }
    }
}

/// Engine-native outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngineOutcome {
    Successful,
    Failed {
        cause: Throwable,
    },
    Aborted {
        #[serde(default)]
        reason: Option<String>,
    },
    Skipped {
        #[serde(default)]
        reason: Option<String>,
    },
}

impl EngineOutcome {
    pub fn status(&self) -> Status {
        match self {
            EngineOutcome::Successful => Status::Passed,
            EngineOutcome::Failed { .. } => Status::Failed,
            EngineOutcome::Aborted { .. } => Status::Aborted,
            EngineOutcome::Skipped { .. } => Status::Skipped,
        }
    }
}

/// What the engine tells us about a finished case
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestIdentifier {
    /// Engine unique id, e.g. `[engine:junit-jupiter]/[class:com.example.Dev]/[method:drinksCoffee()]`
    pub unique_id: String,
    /// Human-readable sentence for the case
    #[serde(alias = "wordify")]
    pub display_name: String,
    /// Owning class; takes precedence over the unique id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clazz: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<ReportNotes>,
    #[serde(default)]
    pub timings: Timings,
}

impl TestIdentifier {
    pub fn new(unique_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            unique_id: unique_id.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, fully_qualified_name: impl Into<String>) -> Self {
        self.clazz = Some(fully_qualified_name.into());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_notes(mut self, notes: ReportNotes) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Class the case belongs to
    pub fn resolve_class(&self) -> Result<Clazz, ReportError> {
        let name = match self.clazz.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => class_from_unique_id(&self.unique_id).ok_or_else(|| {
                ReportError::validation(format!(
                    "cannot resolve test class of '{}'",
                    self.unique_id
                ))
            })?,
        };
        validate_class_name(&name)?;
        Ok(Clazz::from_fully_qualified(&name))
    }
}

/// Class name from the `[class:...]` segment of a unique id; nested classes
/// are appended with `$`.
pub fn class_from_unique_id(unique_id: &str) -> Option<String> {
    let mut class: Option<String> = None;

    for segment in unique_id.split('/') {
        let Some(inner) = segment
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
        else {
            continue;
        };
        let Some((kind, value)) = inner.split_once(':') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        match (kind, class.as_mut()) {
            ("class", _) => class = Some(value.to_string()),
            ("nested-class", Some(outer)) => {
                outer.push('$');
                outer.push_str(value);
            }
            _ => {}
        }
    }

    class
}
