// Report model - the persisted shape of index.json and TEST-<fqcn>.json

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PASSED")]
    Passed,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "DISABLED", alias = "SKIPPED")]
    Skipped,
    #[serde(rename = "ABORTED")]
    Aborted,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Skipped => "DISABLED",
            Status::Aborted => "ABORTED",
        }
    }
}

/// Type descriptor: what a runtime class object would have told us
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clazz {
    pub fully_qualified_name: String,
    pub class_name: String,
    pub package_name: String,
}

impl Clazz {
    pub fn new(
        fully_qualified_name: impl Into<String>,
        class_name: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            fully_qualified_name: fully_qualified_name.into(),
            class_name: class_name.into(),
            package_name: package_name.into(),
        }
    }

    /// Split `com.example.Outer$Inner` into simple name `Inner` and package `com.example`.
    pub fn from_fully_qualified(name: &str) -> Self {
        let (package_name, tail) = match name.rfind('.') {
            Some(idx) => (&name[..idx], &name[idx + 1..]),
            None => ("", name),
        };
        let class_name = tail.rsplit('$').next().unwrap_or(tail);
        Self::new(name, class_name, package_name)
    }
}

/// One argument of a parameterized invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub clazz: Clazz,
    pub value: String,
}

impl Argument {
    pub fn new(clazz: Clazz, value: impl Into<String>) -> Self {
        Self {
            clazz,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub wordify: String,
    #[serde(default)]
    pub arguments: Vec<Option<Argument>>,
}

impl Method {
    pub fn new(name: impl Into<String>, wordify: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wordify: wordify.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(Some(argument));
        self
    }

    /// A `null` argument value
    pub fn with_null_argument(mut self) -> Self {
        self.arguments.push(None);
        self
    }
}

/// Exception chain recorded as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Throwable {
    pub clazz: Clazz,
    pub message: Option<String>,
    pub cause: Option<Box<Throwable>>,
    #[serde(default)]
    pub stack_trace: Vec<String>,
}

impl Throwable {
    pub fn new(fully_qualified_name: &str, message: Option<String>) -> Self {
        Self {
            clazz: Clazz::from_fully_qualified(fully_qualified_name),
            message,
            cause: None,
            stack_trace: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_stack_trace<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stack_trace = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Depth of the cause chain, including this throwable
    pub fn chain_len(&self) -> usize {
        1 + self.cause.as_ref().map_or(0, |c| c.chain_len())
    }
}

/// Durations in milliseconds; zero when unmeasured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    #[serde(default)]
    pub before_each: u64,
    #[serde(default)]
    pub after_each: u64,
    #[serde(default)]
    pub under_test: u64,
    #[serde(default)]
    pub total: u64,
}

/// Counts for a suite or a whole run.
///
/// Written with `tests`; older fixtures used `count`, which is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(alias = "count")]
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn is_consistent(&self) -> bool {
        self.tests == self.passed + self.failed + self.aborted + self.skipped
    }

    /// Field-wise sum
    pub fn merge(&self, other: &Summary) -> Summary {
        Summary {
            tests: self.tests + other.tests,
            passed: self.passed + other.passed,
            failed: self.failed + other.failed,
            aborted: self.aborted + other.aborted,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Rendered notes; absent (`null`) when nothing was recorded
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportNotes {
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub diagrams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub wordify: String,
    pub status: Status,
    pub cause: Option<Throwable>,
    pub method: Option<Method>,
    pub clazz: Clazz,
    pub notes: Option<ReportNotes>,
    #[serde(default)]
    pub timings: Timings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub title: String,
    pub name: String,
    pub class_name: String,
    pub package_name: String,
    #[serde(alias = "testResults", default)]
    pub test_cases: Vec<TestCase>,
    pub summary: Summary,
    pub notes: Option<ReportNotes>,
}

/// Index entry mapping a suite name to its data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuiteNameToFile {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    #[serde(default)]
    pub test_suites: Vec<TestSuiteNameToFile>,
}

impl Links {
    pub fn file_for(&self, name: &str) -> Option<&str> {
        self.test_suites
            .iter()
            .find(|link| link.name == name)
            .map(|link| link.file.as_str())
    }
}

/// Contents of index.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReportIndex {
    pub time_stamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub summary: Summary,
    #[serde(default)]
    pub links: Links,
}

/// Build stamp attached to a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub time_stamp: String,
    pub version: Option<String>,
}

impl VersionInfo {
    pub fn create(clock: &dyn crate::time::Clock) -> Self {
        Self {
            time_stamp: crate::time::iso8601(&clock.now()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }
}

/// Immutable snapshot of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub index: DataReportIndex,
    pub test_suites: Vec<TestSuite>,
    pub test_cases: Vec<TestCase>,
    pub time_stamp: String,
}

impl Report {
    pub fn suite(&self, name: &str) -> Option<&TestSuite> {
        self.test_suites.iter().find(|suite| suite.name == name)
    }
}

/// Data file name for a suite: `TEST-<fqcn>.json`
pub fn data_file_name(fully_qualified_name: &str) -> String {
    format!("TEST-{}.json", fully_qualified_name)
}

/// Check that a class name can become a single `TEST-<fqcn>.json` file name
pub fn validate_class_name(fully_qualified_name: &str) -> Result<(), ReportError> {
    if fully_qualified_name.trim().is_empty() {
        return Err(ReportError::validation("missing test class name"));
    }
    if let Some(c) = fully_qualified_name
        .chars()
        .find(|c| matches!(c, '/' | '\\') || c.is_control())
    {
        return Err(ReportError::validation(format!(
            "test class name {:?} contains {:?}, which cannot appear in a data file name",
            fully_qualified_name, c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clazz_from_fully_qualified() {
        let clazz = Clazz::from_fully_qualified("java.lang.NullPointerException");
        assert_eq!(clazz.class_name, "NullPointerException");
        assert_eq!(clazz.package_name, "java.lang");
        assert_eq!(clazz.fully_qualified_name, "java.lang.NullPointerException");
    }

    #[test]
    fn test_clazz_nested_and_default_package() {
        let nested = Clazz::from_fully_qualified("com.example.Outer$Inner");
        assert_eq!(nested.class_name, "Inner");
        assert_eq!(nested.package_name, "com.example");

        let bare = Clazz::from_fully_qualified("Dev");
        assert_eq!(bare.class_name, "Dev");
        assert_eq!(bare.package_name, "");
    }

    #[test]
    fn test_class_names_must_fit_one_file_name() {
        assert!(validate_class_name("com.example.Outer$Inner").is_ok());

        for bad in ["", "  ", "com/example/Bad", "com\\example\\Bad", "com.example.\nBad"] {
            let err = validate_class_name(bad).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Validation, "{:?}", bad);
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&Status::Skipped).unwrap(), "\"DISABLED\"");
        let parsed: Status = serde_json::from_str("\"SKIPPED\"").unwrap();
        assert_eq!(parsed, Status::Skipped);
    }

    #[test]
    fn test_summary_accepts_count_alias() {
        let json = r#"{"count":3,"passed":1,"failed":1,"aborted":0,"skipped":1}"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.tests, 3);
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_summary_field_order() {
        let json = serde_json::to_string(&Summary::default()).unwrap();
        assert_eq!(
            json,
            r#"{"tests":0,"passed":0,"failed":0,"aborted":0,"skipped":0}"#
        );
    }

    #[test]
    fn test_suite_accepts_legacy_cases_key() {
        let json = r#"{
            "title": "Dev", "name": "Dev", "className": "Dev", "packageName": "",
            "testResults": [],
            "summary": {"tests":0,"passed":0,"failed":0,"aborted":0,"skipped":0},
            "notes": null
        }"#;
        let suite: TestSuite = serde_json::from_str(json).unwrap();
        assert!(suite.test_cases.is_empty());
        assert!(suite.notes.is_none());
    }

    #[test]
    fn test_throwable_chain_len() {
        let root = Throwable::new("java.lang.IllegalStateException", Some("outer".into()))
            .with_cause(Throwable::new("java.io.IOException", None));
        assert_eq!(root.chain_len(), 2);
    }
}
