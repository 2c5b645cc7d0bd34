use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatusError { status: u16, body: String },

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Network,
    Configuration,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortalError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        PortalError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PortalError::IoError(_) => ErrorCategory::Io,
            PortalError::SerializationError(_) | PortalError::CsvError(_) => ErrorCategory::Data,
            PortalError::ApiError(_) | PortalError::ApiStatusError { .. } => ErrorCategory::Network,
            PortalError::ConfigError { .. }
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PortalError::ValidationError { .. } | PortalError::NotFound { .. } => {
                ErrorCategory::Validation
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PortalError::NotFound { .. } => ErrorSeverity::Low,
            PortalError::ApiError(_) | PortalError::ApiStatusError { .. } => ErrorSeverity::Medium,
            PortalError::ValidationError { .. }
            | PortalError::SerializationError(_)
            | PortalError::CsvError(_) => ErrorSeverity::High,
            PortalError::ConfigError { .. }
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => ErrorSeverity::High,
            PortalError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PortalError::IoError(_) => {
                "Check that the store path exists and is writable".to_string()
            }
            PortalError::SerializationError(_) => {
                "Check that the JSON input matches the expected record shape".to_string()
            }
            PortalError::CsvError(_) => "Retry with --format json or --format table".to_string(),
            PortalError::ApiError(_) => {
                "Check network connectivity and the [explain] endpoint".to_string()
            }
            PortalError::ApiStatusError { status, .. } if *status == 401 => {
                "Check that OPENAI_API_KEY is set to a valid key".to_string()
            }
            PortalError::ApiStatusError { .. } => {
                "The upstream service rejected the request; retry later".to_string()
            }
            PortalError::ConfigError { .. } | PortalError::ConfigValidationError { .. } => {
                "Review the TOML configuration file".to_string()
            }
            PortalError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the configuration", field)
            }
            PortalError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration or environment", field)
            }
            PortalError::ValidationError { .. } => "Correct the input and try again".to_string(),
            PortalError::NotFound { entity, .. } => {
                format!("List existing {} records to find a valid key", entity.to_lowercase())
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PortalError::NotFound { entity, key } => format!("{} '{}' does not exist", entity, key),
            PortalError::ValidationError { message } => message.clone(),
            PortalError::MissingConfigError { field } => format!("Missing setting: {}", field),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_low_severity() {
        let err = PortalError::not_found("Company", "abc");
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.user_friendly_message(), "Company 'abc' does not exist");
    }

    #[test]
    fn test_unauthorized_status_points_at_api_key() {
        let err = PortalError::ApiStatusError {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.recovery_suggestion().contains("OPENAI_API_KEY"));
    }
}
