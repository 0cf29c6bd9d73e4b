use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Taxonomy request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Taxonomy provider error: {message}")]
    ProviderError { message: String },

    #[error("Malformed taxonomy data: {message}")]
    MalformedTaxonomy { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provider,
    Data,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MatchError::ConfigError { .. }
            | MatchError::ConfigValidationError { .. }
            | MatchError::InvalidConfigValueError { .. }
            | MatchError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MatchError::ApiError(_) | MatchError::ProviderError { .. } => ErrorCategory::Provider,
            MatchError::CsvError(_)
            | MatchError::SerializationError(_)
            | MatchError::MalformedTaxonomy { .. } => ErrorCategory::Data,
            MatchError::InvalidInput { .. } => ErrorCategory::Input,
            MatchError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Provider => "The taxonomy service could not be reached".to_string(),
            ErrorCategory::Data => format!("The taxonomy data could not be read: {}", self),
            ErrorCategory::Input => format!("The request was rejected: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MatchError::ApiError(_) | MatchError::ProviderError { .. } => {
                "Check that the taxonomy endpoint is running and reachable"
            }
            MatchError::CsvError(_) => {
                "Check the taxonomy file: it needs category, code, codeDescription and codeDefinition columns"
            }
            MatchError::MalformedTaxonomy { .. } => {
                "Check that the taxonomy service returns full code records"
            }
            MatchError::SerializationError(_) => {
                "Check that the taxonomy source returns valid JSON"
            }
            MatchError::IoError(_) => "Check that the file exists and is readable",
            MatchError::InvalidInput { .. } => "Provide a non-empty productDescription",
            _ => "Review the configuration file and command line arguments",
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = MatchError::ProviderError {
            message: "HTTP 503".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Provider);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = MatchError::MissingConfigError {
            field: "taxonomy.endpoint".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.severity() > ErrorSeverity::Medium);
        assert!(err.to_string().contains("taxonomy.endpoint"));
    }
}
