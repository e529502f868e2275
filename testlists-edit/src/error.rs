//! Error types for testlists-edit.
//!
//! Two families:
//! - Precondition failures: the target changed or vanished between read and
//!   replace, so the rewrite was abandoned and the file left alone.
//! - Runtime errors: I/O or serialization failures.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum PreconditionError {
    /// The file's sha256 no longer matches what was read.
    #[error("{path} changed on disk (expected sha256 {expected}, found {actual})")]
    ContentChanged {
        path: Utf8PathBuf,
        expected: String,
        actual: String,
    },

    #[error("{path} no longer exists")]
    Missing { path: Utf8PathBuf },
}

impl EditError {
    pub fn is_precondition(&self) -> bool {
        matches!(self, EditError::Precondition(_))
    }
}

pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::{EditError, PreconditionError};

    #[test]
    fn precondition_error_is_flagged() {
        let err = EditError::from(PreconditionError::Missing {
            path: "lists/it.csv".into(),
        });
        assert!(err.is_precondition());
        assert!(err.to_string().contains("precondition failed"));
        assert!(err.to_string().contains("lists/it.csv"));
    }

    #[test]
    fn runtime_error_is_not_precondition() {
        let err = EditError::from(anyhow::anyhow!("disk full"));
        assert!(!err.is_precondition());
        assert!(err.to_string().contains("runtime error"));
    }
}
