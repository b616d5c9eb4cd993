//! Error types for the Crew Tax Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while turning duty records into
//! a deduction report.

use thiserror::Error;

/// The main error type for the Crew Tax Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use crew_tax_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/airports.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/airports.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A flight or non-flight day carried a value the engine cannot interpret.
    #[error("Malformed duty record '{record}': {message}")]
    MalformedDutyRecord {
        /// Identifies the offending record (flight number or duty type plus date).
        record: String,
        /// A description of what was malformed.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_malformed_duty_record_displays_record_and_message() {
        let error = EngineError::MalformedDutyRecord {
            record: "flight LH400 on 2024-03-01".to_string(),
            message: "invalid departure time '25:70'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed duty record 'flight LH400 on 2024-03-01': invalid departure time '25:70'"
        );
    }

    #[test]
    fn test_calculation_error_displays_message() {
        let error = EngineError::CalculationError {
            message: "trip without dates".to_string(),
        };
        assert_eq!(error.to_string(), "Calculation error: trip without dates");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_malformed() -> EngineResult<()> {
            Err(EngineError::MalformedDutyRecord {
                record: "flight LH1 on 2024-01-01".to_string(),
                message: "bad".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_malformed()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
