//! Document identity
//!
//! Every session edits one in-memory document addressed by a synthetic path.
//! The path doubles as the schema `fileMatch` pattern, which is what keeps
//! one session's schema from applying to another session's document.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// URI of a document known to the language service
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentUri(String);

impl DocumentUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Unique `<uuid>.yaml` file name generated per session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntheticPath {
    file_name: String,
}

impl SyntheticPath {
    pub const EXTENSION: &'static str = "yaml";

    pub fn generate() -> Self {
        Self {
            file_name: format!("{}.{}", Uuid::new_v4(), Self::EXTENSION),
        }
    }

    /// Glob handed to the language service as the schema `fileMatch`
    pub fn file_match(&self) -> &str {
        &self.file_name
    }

    pub fn uri(&self) -> DocumentUri {
        DocumentUri::new(format!("file:///{}", self.file_name))
    }
}

impl fmt::Display for SyntheticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Convert a filesystem path to a `file://` URI
pub fn path_to_uri(path: &Path) -> String {
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let path_str = abs_path.to_string_lossy();
    let encoded: String = path_str
        .chars()
        .map(|c| match c {
            '/' | '.' | '-' | '_' | '~' => c.to_string(),
            c if c.is_ascii_alphanumeric() => c.to_string(),
            c => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect();

    format!("file://{encoded}")
}
