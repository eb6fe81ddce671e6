//! Configuration errors
//!
//! Runtime operations on rings and the arena never fail; they are guarded
//! no-ops with a log line. Only building a match from configuration can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Match configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The sequencer needs at least `required` rings
    #[error("arena needs at least {required} rings, got {found}")]
    TooFewRings {
        /// Number of rings provided
        found: usize,
        /// Minimum ring count
        required: usize,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Settings file could not be parsed
    #[error("parse error in {path}: {message}")]
    Parse {
        /// Path to the settings file (or `<inline>`)
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Settings file could not be read
    #[error("failed to read {path}")]
    Io {
        /// Path to the settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`]
    pub fn invalid(field: impl Into<String>, value: impl ToString, expected: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = ConfigError::TooFewRings { found: 1, required: 2 };
        assert_eq!(err.to_string(), "arena needs at least 2 rings, got 1");

        let err = ConfigError::invalid("match_duration", -1.0, "a positive number of seconds");
        assert_eq!(
            err.to_string(),
            "invalid value for 'match_duration': got '-1', expected a positive number of seconds"
        );
    }
}
