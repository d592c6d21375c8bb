//! yamlpane - schema-validated YAML editing panes
//!
//! A YAML editor component that keeps two derived views in sync with the
//! text: breadcrumbs for the structural path under the cursor, and a
//! problems list of schema-validation markers. Validation and outline come
//! from yaml-language-server over LSP.

pub mod app;
pub mod cli;
pub mod config;
pub mod editor;
pub mod environment;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;
pub mod session;
pub mod view;

pub use error::{PaneError, PaneResult};
pub use session::YamlEditor;
