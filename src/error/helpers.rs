use super::{ErrorCode, PolarionError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a storage PolarionError carrying the original as source
    fn to_storage_error(self, message: impl Into<String>) -> Result<T, PolarionError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_storage_error(self, message: impl Into<String>) -> Result<T, PolarionError> {
        self.map_err(|e| PolarionError::storage(message).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for configuration
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> PolarionError {
        PolarionError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
            None,
        )
    }

    /// Create an error listing the mandatory parameters that are absent
    pub fn missing_mandatory_parameters(missing: &[&str]) -> PolarionError {
        PolarionError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!(
                "Polarion issues sensor will not run due to some parameters are missing: {}",
                missing.join(", ")
            ),
            missing.first().map(|f| f.to_string()),
        )
    }

    /// Create an error for a remote call timeout that would expire at once
    pub fn zero_timeout() -> PolarionError {
        PolarionError::config_with_code(
            ErrorCode::CONFIG_INVALID_VALUE,
            "timeout_secs must be greater than zero",
            Some("timeout_secs".to_string()),
        )
    }

    /// Create an error for an empty project id
    pub fn empty_project_id() -> PolarionError {
        PolarionError::InvalidProject {
            code: ErrorCode::PROJECT_EMPTY_ID,
            message: "Polarion project id must not be empty".to_string(),
            project_id: String::new(),
        }
    }

    /// Create an error for a SOAP fault returned by the server
    pub fn soap_fault(operation: &str, fault: &str) -> PolarionError {
        PolarionError::remote_with_code(
            ErrorCode::REMOTE_FAULT,
            fault.to_string(),
            Some(operation.to_string()),
        )
    }

    /// Create an error for a SOAP response that is missing an expected element
    pub fn malformed_response(operation: &str, detail: impl Into<String>) -> PolarionError {
        PolarionError::remote_with_code(
            ErrorCode::REMOTE_MALFORMED_RESPONSE,
            detail,
            Some(operation.to_string()),
        )
    }

    /// Create an error for a distribution payload that cannot be parsed
    pub fn malformed_distribution(detail: impl Into<String>) -> PolarionError {
        PolarionError::validation_with_code(ErrorCode::VALIDATION_INVALID_FORMAT, detail)
    }
}
