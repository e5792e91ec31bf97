// Error types for the reporting core

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification used by callers that map errors to responses
/// (a report server answers `NotFound` with 404 and `Read` with 500).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Read,
    Write,
    Validation,
}

/// Errors raised while recording, assembling, persisting or loading reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested index or suite does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// An artifact is indexed but could not be read or parsed
    #[error("failed to read report artifact {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadFailure,
    },

    /// Persisting the report failed
    #[error("failed to write report artifact {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An additional reporter failed after the data files were written
    #[error("{name} reporter failed")]
    Reporter {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A result or event violated a construction-time invariant
    #[error("invalid report state: {0}")]
    Validation(String),
}

/// Underlying cause of a [`ReportError::Read`]
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::NotFound { .. } => ErrorKind::NotFound,
            ReportError::Read { .. } => ErrorKind::Read,
            ReportError::Write { .. } | ReportError::Reporter { .. } => ErrorKind::Write,
            ReportError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        ReportError::NotFound { what: what.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<ReadFailure>) -> Self {
        ReportError::Read {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        ReportError::Write {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ReportError::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ReportError::not_found("index").kind(), ErrorKind::NotFound);
        assert_eq!(
            ReportError::validation("bad").kind(),
            ErrorKind::Validation
        );

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ReportError::read("x.json", io).kind(), ErrorKind::Read);
    }

    #[test]
    fn test_display_includes_path() {
        let io = std::io::Error::other("disk full");
        let err = ReportError::write("/tmp/flowbdd/data/index.json", io);
        assert!(err.to_string().contains("index.json"));
    }
}
