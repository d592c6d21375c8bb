//! Language-intelligence service
//!
//! Validation, outline and document sync for the YAML language. All work is
//! asynchronous; markers arrive as whole per-document batches through
//! [`LanguageService::on_did_change_markers`].

mod converters;
mod service;

use std::sync::Arc;

use async_trait::async_trait;

use crate::editor::Subscription;
use crate::environment::DiagnosticsOptions;
use crate::error::LspError;
use crate::models::{DocumentUri, Marker, Symbol};

pub use service::LspLanguageService;

/// Receives the URIs whose marker batch was replaced
pub type MarkerListener = Arc<dyn Fn(&[DocumentUri]) + Send + Sync>;

#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Replace the effective options (feature switches and schema list)
    fn configure(&self, options: &DiagnosticsOptions);

    fn open_document(&self, uri: &DocumentUri, language_id: &str, text: &str);

    /// Full-text update of an open document
    fn update_document(&self, uri: &DocumentUri, text: &str);

    fn close_document(&self, uri: &DocumentUri);

    /// Outline of the document as of the last update
    async fn document_symbols(&self, uri: &DocumentUri) -> Result<Vec<Symbol>, LspError>;

    /// Latest marker batch for `uri`
    fn markers(&self, uri: &DocumentUri) -> Vec<Marker>;

    fn on_did_change_markers(&self, listener: MarkerListener) -> Subscription;
}
