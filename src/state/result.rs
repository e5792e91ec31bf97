// Test case result - one finished invocation of a test method

use crate::error::ReportError;
use crate::report::model::{
    Clazz, Method, Status, TestCase, Throwable, Timings, validate_class_name,
};
use crate::state::Notes;

/// Immutable record of one test case outcome.
///
/// A cause is present exactly when the status is `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    wordify: String,
    status: Status,
    cause: Option<Throwable>,
    method: Option<Method>,
    clazz: Clazz,
    notes: Notes,
    timings: Timings,
}

impl TestCaseResult {
    /// Build a result from loose parts, rejecting inconsistent combinations
    pub fn new(
        clazz: Clazz,
        wordify: impl Into<String>,
        status: Status,
        cause: Option<Throwable>,
    ) -> Result<Self, ReportError> {
        validate_class_name(&clazz.fully_qualified_name)?;
        match (status, &cause) {
            (Status::Failed, None) => {
                return Err(ReportError::validation(format!(
                    "FAILED result for {} has no cause",
                    clazz.fully_qualified_name
                )));
            }
            (status, Some(_)) if status != Status::Failed => {
                return Err(ReportError::validation(format!(
                    "{} result for {} carries a cause",
                    status.as_str(),
                    clazz.fully_qualified_name
                )));
            }
            _ => {}
        }
        Ok(Self::with_status(clazz, wordify, status, cause))
    }

    /// Create a passed result
    pub fn passed(clazz: Clazz, wordify: impl Into<String>) -> Self {
        Self::with_status(clazz, wordify, Status::Passed, None)
    }

    /// Create a failed result
    pub fn failed(clazz: Clazz, wordify: impl Into<String>, cause: Throwable) -> Self {
        Self::with_status(clazz, wordify, Status::Failed, Some(cause))
    }

    /// Create a skipped (disabled) result
    pub fn skipped(clazz: Clazz, wordify: impl Into<String>) -> Self {
        Self::with_status(clazz, wordify, Status::Skipped, None)
    }

    /// Create an aborted result
    pub fn aborted(clazz: Clazz, wordify: impl Into<String>) -> Self {
        Self::with_status(clazz, wordify, Status::Aborted, None)
    }

    fn with_status(
        clazz: Clazz,
        wordify: impl Into<String>,
        status: Status,
        cause: Option<Throwable>,
    ) -> Self {
        Self {
            wordify: wordify.into(),
            status,
            cause,
            method: None,
            clazz,
            notes: Notes::default(),
            timings: Timings::default(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_notes(mut self, notes: Notes) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn wordify(&self) -> &str {
        &self.wordify
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn cause(&self) -> Option<&Throwable> {
        self.cause.as_ref()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn clazz(&self) -> &Clazz {
        &self.clazz
    }

    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Hand the result over to the report model
    pub fn into_test_case(self) -> TestCase {
        TestCase {
            notes: self.notes.to_report(),
            wordify: self.wordify,
            status: self.status,
            cause: self.cause,
            method: self.method,
            clazz: self.clazz,
            timings: self.timings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev() -> Clazz {
        Clazz::from_fully_qualified("com.example.Dev")
    }

    #[test]
    fn test_passed_has_no_cause() {
        let result = TestCaseResult::passed(dev(), "drinks coffee");
        assert_eq!(result.status(), Status::Passed);
        assert!(result.cause().is_none());
        assert_eq!(result.timings(), Timings::default());
    }

    #[test]
    fn test_failed_keeps_cause() {
        let cause = Throwable::new("java.lang.NullPointerException", None);
        let result = TestCaseResult::failed(dev(), "spills coffee", cause);
        assert_eq!(result.status(), Status::Failed);
        assert_eq!(
            result.cause().map(|c| c.clazz.class_name.as_str()),
            Some("NullPointerException")
        );
    }

    #[test]
    fn test_new_rejects_failed_without_cause() {
        let err = TestCaseResult::new(dev(), "x", Status::Failed, None).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_cause_on_non_failed() {
        let cause = Throwable::new("java.lang.RuntimeException", None);
        let err = TestCaseResult::new(dev(), "x", Status::Aborted, Some(cause)).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_missing_class() {
        let err = TestCaseResult::new(Clazz::new("", "", ""), "x", Status::Passed, None)
            .unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_class_with_path_separator() {
        let clazz = Clazz::from_fully_qualified("com/example/Bad");
        let err = TestCaseResult::new(clazz, "x", Status::Passed, None).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }

    #[test]
    fn test_into_test_case_collapses_empty_notes() {
        let case = TestCaseResult::passed(dev(), "drinks coffee")
            .with_method(Method::new("drinksCoffee", "Drinks coffee"))
            .into_test_case();
        assert!(case.notes.is_none());
        assert_eq!(case.method.map(|m| m.name), Some("drinksCoffee".to_string()));
    }
}
