//! Validation markers reported by the language service

use serde::{Deserialize, Serialize};

use super::document::DocumentUri;
use super::position::Position;

/// A diagnostic attached to one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub resource: DocumentUri,
    pub severity: MarkerSeverity,
    pub message: String,
    pub start: Position,
    pub end: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Marker {
    pub fn new(
        resource: DocumentUri,
        severity: MarkerSeverity,
        message: impl Into<String>,
        start: Position,
    ) -> Self {
        Self {
            resource,
            severity,
            message: message.into(),
            start,
            end: start,
            source: None,
        }
    }

    pub fn with_end(mut self, end: Position) -> Self {
        self.end = end;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSeverity {
    Hint,
    Info,
    Warning,
    Error,
}

impl MarkerSeverity {
    /// Parse from LSP numeric value. Missing or unknown severities count as
    /// informational.
    pub fn from_lsp(value: Option<u8>) -> Self {
        match value {
            Some(1) => Self::Error,
            Some(2) => Self::Warning,
            Some(4) => Self::Hint,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for MarkerSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

impl std::str::FromStr for MarkerSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "e" => Ok(Self::Error),
            "warning" | "warn" | "w" => Ok(Self::Warning),
            "info" | "information" | "i" => Ok(Self::Info),
            "hint" | "h" => Ok(Self::Hint),
            _ => Err(format!(
                "Unknown severity: '{}'. Valid: error, warning, info, hint",
                s
            )),
        }
    }
}
