use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::ErrorCode;
pub use helpers::{common, ErrorExt};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the whole crate
#[derive(Error, Debug)]
pub enum PolarionError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Authentication failed: {message}")]
    Authentication {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Invalid project: {message}")]
    InvalidProject {
        code: u16,
        message: String,
        project_id: String,
    },

    #[error("[E{code:04}] Remote lookup failed: {message}")]
    RemoteLookup {
        code: u16,
        message: String,
        operation: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Remote call '{operation}' timed out after {timeout:?}")]
    RemoteTimeout {
        code: u16,
        operation: String,
        timeout: Duration,
    },

    #[error("[E{code:04}] Storage error: {message}")]
    Storage {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PolarionError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create a configuration error with specific code and offending field
    pub fn config_with_code(code: u16, message: impl Into<String>, field: Option<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Create an authentication error with default code
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::authentication_with_code(ErrorCode::AUTH_GENERIC, message)
    }

    pub fn authentication_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Authentication {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error for a project id the server cannot resolve
    pub fn invalid_project(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self::InvalidProject {
            code: ErrorCode::PROJECT_UNRESOLVABLE,
            message: format!(
                "Polarion project id: {} does not exist. Please check the spelling.",
                project_id
            ),
            project_id,
        }
    }

    /// Create a remote lookup error with default code
    pub fn remote(message: impl Into<String>) -> Self {
        Self::remote_with_code(ErrorCode::REMOTE_GENERIC, message, None)
    }

    /// Create a remote lookup error with specific code and operation name
    pub fn remote_with_code(
        code: u16,
        message: impl Into<String>,
        operation: Option<String>,
    ) -> Self {
        Self::RemoteLookup {
            code,
            message: message.into(),
            operation,
            source: None,
        }
    }

    /// Create a timeout error for a remote operation
    pub fn remote_timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::RemoteTimeout {
            code: ErrorCode::REMOTE_TIMEOUT,
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a storage error with default code
    pub fn storage(message: impl Into<String>) -> Self {
        Self::storage_with_code(ErrorCode::STORAGE_GENERIC, message, None)
    }

    /// Create a storage error with specific code and path
    pub fn storage_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Storage {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a validation error with default code
    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_code(ErrorCode::VALIDATION_GENERIC, message)
    }

    pub fn validation_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    ///
    /// Variants without a source slot keep their shape; the source is dropped.
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Authentication { source: src, .. }
            | Self::RemoteLookup { source: src, .. }
            | Self::Storage { source: src, .. }
            | Self::Validation { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::InvalidProject { .. } | Self::RemoteTimeout { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Authentication { message, .. }
            | Self::InvalidProject { message, .. }
            | Self::RemoteLookup { message, .. }
            | Self::Storage { message, .. }
            | Self::Validation { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
            Self::RemoteTimeout { operation, .. } => {
                *operation = format!("{} ({})", operation, context);
            }
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Authentication { .. } => 3,
            Self::InvalidProject { .. } => 4,
            Self::RemoteLookup { .. } | Self::RemoteTimeout { .. } => 5,
            Self::Storage { .. } => 6,
            Self::Validation { .. } => 8,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Authentication { code, .. }
            | Self::InvalidProject { code, .. }
            | Self::RemoteLookup { code, .. }
            | Self::RemoteTimeout { code, .. }
            | Self::Storage { code, .. }
            | Self::Validation { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, field, .. } => match field {
                Some(f) => format!("Configuration problem with '{}': {}", f, message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Authentication { message, .. } => {
                format!("Could not log in to the Polarion server: {}", message)
            }
            Self::InvalidProject { message, .. } => message.clone(),
            Self::RemoteLookup {
                message, operation, ..
            } => match operation {
                Some(op) => format!("Polarion call '{}' failed: {}", op, message),
                None => format!("Polarion call failed: {}", message),
            },
            Self::RemoteTimeout {
                operation, timeout, ..
            } => format!(
                "Polarion call '{}' timed out after {} seconds",
                operation,
                timeout.as_secs_f32()
            ),
            Self::Storage { message, path, .. } => match path {
                Some(p) => format!("Storage error at {}: {}", p.display(), message),
                None => format!("Storage error: {}", message),
            },
            Self::Validation { message, .. } => format!("Validation error: {}", message),
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(&format!("\n  caused by: {}", err));
            source = err.source();
        }
        out
    }

    /// Whether the error belongs to the connection failure path
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::RemoteTimeout { .. }
        ) || matches!(
            self,
            Self::RemoteLookup { code, .. } if *code == ErrorCode::REMOTE_TRANSPORT
        )
    }
}

/// Type alias for Results using PolarionError
pub type Result<T> = std::result::Result<T, PolarionError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

impl From<std::io::Error> for PolarionError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::STORAGE_NOT_FOUND, "File or directory not found"),
            ErrorKind::PermissionDenied => {
                (ErrorCode::STORAGE_PERMISSION_DENIED, "Permission denied")
            }
            ErrorKind::InvalidData => (ErrorCode::STORAGE_DESERIALIZATION_ERROR, "Invalid data"),
            _ => (ErrorCode::STORAGE_IO_ERROR, "IO operation failed"),
        };

        PolarionError::storage_with_code(code, message, None).with_source(err)
    }
}

impl From<serde_json::Error> for PolarionError {
    fn from(err: serde_json::Error) -> Self {
        PolarionError::storage_with_code(
            ErrorCode::STORAGE_DESERIALIZATION_ERROR,
            "Invalid JSON in measure store",
            None,
        )
        .with_source(err)
    }
}

impl From<toml::de::Error> for PolarionError {
    fn from(err: toml::de::Error) -> Self {
        PolarionError::config_with_code(
            ErrorCode::CONFIG_INVALID_TOML,
            "Invalid TOML syntax",
            None,
        )
        .with_source(err)
    }
}

impl From<url::ParseError> for PolarionError {
    fn from(err: url::ParseError) -> Self {
        PolarionError::config_with_code(
            ErrorCode::CONFIG_INVALID_URL,
            format!("Server URL is not valid: {}", err),
            Some("server_url".to_string()),
        )
        .with_source(err)
    }
}

impl From<quick_xml::Error> for PolarionError {
    fn from(err: quick_xml::Error) -> Self {
        PolarionError::remote_with_code(
            ErrorCode::REMOTE_MALFORMED_RESPONSE,
            "Malformed SOAP response",
            None,
        )
        .with_source(err)
    }
}

impl From<reqwest::Error> for PolarionError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_connect() || err.is_request() || err.is_timeout() {
            ErrorCode::REMOTE_TRANSPORT
        } else {
            ErrorCode::REMOTE_GENERIC
        };
        PolarionError::remote_with_code(code, format!("HTTP request failed: {}", err), None)
            .with_source(err)
    }
}

#[cfg(test)]
mod tests;
