//! Data models for yamlpane
//!
//! Contains core type definitions used throughout the crate.

pub mod config;
pub mod document;
pub mod marker;
pub mod position;
pub mod props;
pub mod symbol;

// Re-export commonly used types
pub use config::PaneConfig;
pub use document::{DocumentUri, SyntheticPath};
pub use marker::{Marker, MarkerSeverity};
pub use position::{Position, Range};
pub use props::{Callback, ChangeCallback, EditorProps, Style};
pub use symbol::{Symbol, SymbolKind};
