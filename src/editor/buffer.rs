//! Headless in-memory editor
//!
//! Backs the CLI and the test-suite. Behaves like a GUI editor as far as the
//! session controller can tell: edits and cursor moves fire the same events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::events::{ListenerSet, Subscription};
use super::{
    ContentListener, CursorListener, EditorFactory, EditorOptions, EditorSurface, MountTarget,
    TextModel,
};
use crate::error::SessionError;
use crate::models::{DocumentUri, Position};

pub struct BufferModel {
    uri: DocumentUri,
    language_id: String,
    text: RwLock<String>,
    disposed: AtomicBool,
}

impl BufferModel {
    pub fn new(value: &str, language_id: &str, uri: DocumentUri) -> Self {
        Self {
            uri,
            language_id: language_id.to_string(),
            text: RwLock::new(value.to_string()),
            disposed: AtomicBool::new(false),
        }
    }
}

impl TextModel for BufferModel {
    fn uri(&self) -> &DocumentUri {
        &self.uri
    }

    fn language_id(&self) -> &str {
        &self.language_id
    }

    fn value(&self) -> String {
        self.text.read().clone()
    }

    fn set_value(&self, value: &str) {
        *self.text.write() = value.to_string();
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

pub struct BufferEditor {
    target_id: String,
    model: Arc<dyn TextModel>,
    position: Mutex<Position>,
    focused: AtomicBool,
    options: Mutex<EditorOptions>,
    content_listeners: ListenerSet<()>,
    cursor_listeners: ListenerSet<Position>,
    disposed: AtomicBool,
}

impl BufferEditor {
    pub fn new(target: &MountTarget, model: Arc<dyn TextModel>, options: EditorOptions) -> Self {
        Self {
            target_id: target.id.clone(),
            model,
            position: Mutex::new(Position::default()),
            focused: AtomicBool::new(false),
            options: Mutex::new(options),
            content_listeners: ListenerSet::new(),
            cursor_listeners: ListenerSet::new(),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Replace the whole text as a user edit would.
    ///
    /// Returns `false` without touching the buffer when the editor is
    /// read-only or disposed.
    pub fn edit(&self, value: &str) -> bool {
        if self.is_disposed() || self.options.lock().read_only {
            return false;
        }
        self.model.set_value(value);
        self.content_listeners.emit(&());
        true
    }

    /// Number of attached content and cursor listeners
    pub fn listener_count(&self) -> usize {
        self.content_listeners.len() + self.cursor_listeners.len()
    }

    pub fn blur(&self) {
        self.focused.store(false, Ordering::Release);
    }
}

impl EditorSurface for BufferEditor {
    fn value(&self) -> String {
        self.model.value()
    }

    fn model(&self) -> Option<Arc<dyn TextModel>> {
        if self.is_disposed() {
            None
        } else {
            Some(Arc::clone(&self.model))
        }
    }

    fn position(&self) -> Position {
        *self.position.lock()
    }

    fn set_position(&self, position: Position) {
        if self.is_disposed() {
            return;
        }
        *self.position.lock() = position;
        self.cursor_listeners.emit(&position);
    }

    fn focus(&self) {
        if !self.is_disposed() {
            self.focused.store(true, Ordering::Release);
        }
    }

    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::Acquire)
    }

    fn options(&self) -> EditorOptions {
        self.options.lock().clone()
    }

    fn update_options(&self, options: &EditorOptions) {
        *self.options.lock() = options.clone();
    }

    fn on_did_change_content(&self, listener: ContentListener) -> Subscription {
        self.content_listeners.add(listener)
    }

    fn on_did_change_cursor_position(&self, listener: CursorListener) -> Subscription {
        self.cursor_listeners.add(listener)
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.content_listeners.clear();
        self.cursor_listeners.clear();
        self.focused.store(false, Ordering::Release);
        tracing::debug!("Editor on '{}' disposed", self.target_id);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Factory that keeps track of what it created
#[derive(Default)]
pub struct BufferEditorFactory {
    models: Mutex<Vec<Weak<BufferModel>>>,
    editors: Mutex<Vec<Weak<BufferEditor>>>,
    fail_editor_creation: AtomicBool,
}

impl BufferEditorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_editor` calls fail
    pub fn fail_editor_creation(&self, fail: bool) {
        self.fail_editor_creation.store(fail, Ordering::Release);
    }

    /// Editors created and not yet disposed
    pub fn live_editors(&self) -> Vec<Arc<BufferEditor>> {
        self.editors
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|e| !e.is_disposed())
            .collect()
    }

    /// Models created and not yet disposed
    pub fn live_models(&self) -> Vec<Arc<BufferModel>> {
        self.models
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|m| !m.is_disposed())
            .collect()
    }

    pub fn editors_created(&self) -> usize {
        self.editors.lock().len()
    }

    /// The most recently created editor, if still alive
    pub fn last_editor(&self) -> Option<Arc<BufferEditor>> {
        self.editors.lock().last().and_then(Weak::upgrade)
    }
}

impl EditorFactory for BufferEditorFactory {
    fn create_model(
        &self,
        value: &str,
        language_id: &str,
        uri: &DocumentUri,
    ) -> Result<Arc<dyn TextModel>, SessionError> {
        let model = Arc::new(BufferModel::new(value, language_id, uri.clone()));
        self.models.lock().push(Arc::downgrade(&model));
        Ok(model)
    }

    fn create_editor(
        &self,
        target: &MountTarget,
        model: Arc<dyn TextModel>,
        options: EditorOptions,
    ) -> Result<Arc<dyn EditorSurface>, SessionError> {
        if self.fail_editor_creation.load(Ordering::Acquire) {
            return Err(SessionError::Editor(format!(
                "editor construction refused on '{}'",
                target.id
            )));
        }
        if model.is_disposed() {
            return Err(SessionError::Editor("model is disposed".to_string()));
        }

        let editor = Arc::new(BufferEditor::new(target, model, options));
        self.editors.lock().push(Arc::downgrade(&editor));
        Ok(editor)
    }
}
