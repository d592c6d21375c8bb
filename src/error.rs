//! Error types for yamlpane

use thiserror::Error;

pub type PaneResult<T> = std::result::Result<T, PaneError>;

#[derive(Debug, Error)]
pub enum PaneError {
    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Failed to start server: {0}")]
    ServerStart(String),

    #[error("Server not connected")]
    NotConnected,

    #[error("Server not installed: {name}. Install: {install_hint}")]
    ServerNotInstalled { name: String, install_hint: String },

    #[error("Language server terminated unexpectedly")]
    ServerTerminated,

    #[error("{0}")]
    Timeout(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Language service stopped")]
    ServiceStopped,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    const CANCELLED_ERROR_CODE: i32 = -32800;
    const CONTENT_MODIFIED_ERROR_CODE: i32 = -32801;

    pub fn error_code(&self) -> i32 {
        match self {
            Self::ServerError { code, .. } => *code,
            Self::ServerTerminated => -32099,
            Self::Timeout(_) => -32001,
            Self::NotConnected => -32003,
            Self::RequestCancelled => Self::CANCELLED_ERROR_CODE,
            _ => -32000,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled)
            || matches!(self, Self::ServerError { code, .. } if *code == Self::CANCELLED_ERROR_CODE)
    }

    /// The document changed while the server was computing the answer
    pub fn is_content_modified(&self) -> bool {
        matches!(self, Self::ServerError { code, .. } if *code == Self::CONTENT_MODIFIED_ERROR_CODE)
    }

    /// Whether retrying the same request can succeed
    pub fn is_retryable(&self) -> bool {
        self.is_content_modified() || matches!(self, Self::Timeout(_))
    }

    pub fn needs_restart(&self) -> bool {
        matches!(
            self,
            Self::ServerTerminated | Self::NotConnected | Self::ServiceStopped
        ) || self.is_server_shutdown()
    }

    fn is_server_shutdown(&self) -> bool {
        matches!(self, Self::ServerError { message, .. }
            if message.to_lowercase().contains("shutdown")
               || message.to_lowercase().contains("server stopped"))
    }

    pub fn server_error_friendly(code: i32, message: String) -> Self {
        let actual_message = message
            .strip_prefix("Server error [")
            .and_then(|s| s.find("]: ").map(|i| s[i + 3..].to_string()))
            .unwrap_or(message);

        let friendly_message = match code {
            -32601 => format!("Feature not supported: {}", actual_message),
            -32002 => "Server initializing. Try again in a moment.".to_string(),
            -32801 => "Document changed during operation.".to_string(),
            -32603 if actual_message.trim().is_empty() => "Operation failed.".to_string(),
            _ => actual_message,
        };

        Self::ServerError {
            code,
            message: friendly_message,
        }
    }
}

impl From<crate::infra::lsp::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::lsp::protocol::ResponseError) -> Self {
        LspError::server_error_friendly(err.code, err.message)
    }
}

/// Failures while creating an editor session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Mount target is not attached")]
    MountTargetMissing,

    #[error("No async runtime available for language-service requests")]
    NoRuntime,

    #[error("Failed to create text model: {0}")]
    Model(String),

    #[error("Failed to create editor: {0}")]
    Editor(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
