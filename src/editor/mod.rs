//! Editing surface contracts
//!
//! The text editor itself (buffer, undo, rendering) lives outside this crate.
//! These traits are the slice of it the session controller drives.
//! [`buffer`] provides a headless implementation.

pub mod buffer;
pub mod events;

use std::sync::Arc;

use serde::Serialize;

use crate::error::SessionError;
use crate::models::{DocumentUri, Position, Style};

pub use buffer::{BufferEditor, BufferEditorFactory, BufferModel};
pub use events::{ListenerSet, Subscription};

pub type ContentListener = Arc<dyn Fn(&()) + Send + Sync>;
pub type CursorListener = Arc<dyn Fn(&Position) + Send + Sync>;

/// Options applied when an editor is created or re-themed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorOptions {
    pub read_only: bool,
    pub theme: String,
    pub automatic_layout: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            theme: crate::session::theme::LIGHT_THEME.to_string(),
            automatic_layout: true,
        }
    }
}

/// Element the editor attaches to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTarget {
    pub id: String,
    pub style: Style,
}

impl MountTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            style: Style::editor_default(),
        }
    }
}

/// Document buffer bound to a URI
pub trait TextModel: Send + Sync {
    fn uri(&self) -> &DocumentUri;
    fn language_id(&self) -> &str;
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn dispose(&self);
    fn is_disposed(&self) -> bool;
}

/// A live editor instance
pub trait EditorSurface: Send + Sync {
    fn value(&self) -> String;
    fn model(&self) -> Option<Arc<dyn TextModel>>;
    fn position(&self) -> Position;
    /// Move the cursor. Fires cursor-change listeners.
    fn set_position(&self, position: Position);
    fn focus(&self);
    fn has_focus(&self) -> bool;
    fn options(&self) -> EditorOptions;
    fn update_options(&self, options: &EditorOptions);
    fn on_did_change_content(&self, listener: ContentListener) -> Subscription;
    fn on_did_change_cursor_position(&self, listener: CursorListener) -> Subscription;
    fn dispose(&self);
    fn is_disposed(&self) -> bool;
}

/// Creates models and editors for a host
pub trait EditorFactory: Send + Sync {
    fn create_model(
        &self,
        value: &str,
        language_id: &str,
        uri: &DocumentUri,
    ) -> Result<Arc<dyn TextModel>, SessionError>;

    fn create_editor(
        &self,
        target: &MountTarget,
        model: Arc<dyn TextModel>,
        options: EditorOptions,
    ) -> Result<Arc<dyn EditorSurface>, SessionError>;
}
