use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Malformed expression '{input}': {reason}")]
    MalformedExpression { input: String, reason: String },

    #[error("Not a rational function: {reason}")]
    NotARationalFunction { reason: String },

    #[error("Results request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Results source returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Could not read draw results: {message}")]
    DrawParseError { message: String },

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Plot rendering failed: {message}")]
    PlotError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Medium 2 (retry may help), High 1, Critical 3.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl LabError {
    pub fn malformed(input: &str, reason: impl Into<String>) -> Self {
        LabError::MalformedExpression {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LabError::MalformedExpression { .. }
            | LabError::NotARationalFunction { .. }
            | LabError::ValidationError { .. } => ErrorCategory::Input,
            LabError::ApiError(_)
            | LabError::HttpStatusError { .. }
            | LabError::DrawParseError { .. } => ErrorCategory::Network,
            LabError::ConfigValidationError { .. }
            | LabError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LabError::PlotError { .. } | LabError::CsvError(_) => ErrorCategory::Rendering,
            LabError::IoError(_) | LabError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// Drives the process exit code through [`ErrorSeverity::exit_code`].
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LabError::MalformedExpression { .. } => {
                "Write the function as (a*x + b)/(c*x + d), for example (2*x+1)/(x-3)"
            }
            LabError::NotARationalFunction { .. } => {
                "The denominator must contain x, for example 1/(x-3) + 2"
            }
            LabError::ApiError(_) | LabError::HttpStatusError { .. } => {
                "Check the network connection or the [lotto] endpoint, then try again"
            }
            LabError::DrawParseError { .. } => {
                "The round may not be drawn yet; pass an earlier --round"
            }
            LabError::ConfigValidationError { .. }
            | LabError::InvalidConfigValueError { .. } => "Fix the configuration value and rerun",
            LabError::ValidationError { .. } => "Check the input values and their allowed ranges",
            LabError::PlotError { .. } | LabError::CsvError(_) => {
                "Rerun with --no-plot to get the text report only"
            }
            LabError::IoError(_) => "Check that the output directory is writable",
            LabError::SerializationError(_) => "Rerun without --json",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LabError::MalformedExpression { reason, .. } => {
                format!("Could not read the expression: {}", reason)
            }
            LabError::NotARationalFunction { reason } => {
                format!("This is not a rational function: {}", reason)
            }
            LabError::ApiError(_) | LabError::HttpStatusError { .. } => {
                "Could not fetch the winning numbers".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_high_severity() {
        let err = LabError::malformed("x+", "unexpected end of input");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("x+"));
    }

    #[test]
    fn test_network_errors_are_retryable_severity() {
        let err = LabError::HttpStatusError {
            status: 503,
            url: "http://localhost/results".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Could not fetch the winning numbers");
    }

    #[test]
    fn test_not_rational_message() {
        let err = LabError::NotARationalFunction {
            reason: "the denominator is the constant 4".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "This is not a rational function: the denominator is the constant 4"
        );
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let io = LabError::IoError(std::io::Error::other("disk full"));
        assert_eq!(io.severity().exit_code(), 3);
        assert_eq!(LabError::malformed("x+", "eof").severity().exit_code(), 1);
        let fetch = LabError::DrawParseError {
            message: "fail".to_string(),
        };
        assert_eq!(fetch.severity().exit_code(), 2);
    }
}
