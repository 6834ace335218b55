//! Error types for log analysis

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering, parsing or summarizing sweep logs
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No log files found in {}", dir.display())]
    NoLogFiles { dir: PathBuf },

    #[error("No valid data found in {files} log file(s)")]
    NoValidData { files: usize },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl AnalysisError {
    /// True for the "nothing to analyze" outcomes that end a run gracefully
    pub fn is_empty_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::NoLogFiles { .. } | AnalysisError::NoValidData { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_classification() {
        let none = AnalysisError::NoLogFiles {
            dir: PathBuf::from("."),
        };
        assert!(none.is_empty_input());
        assert!(AnalysisError::NoValidData { files: 2 }.is_empty_input());
        let io = AnalysisError::Io {
            path: PathBuf::from("a.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!io.is_empty_input());
    }

    #[test]
    fn test_error_messages() {
        let err = AnalysisError::NoValidData { files: 3 };
        assert_eq!(err.to_string(), "No valid data found in 3 log file(s)");
    }
}
