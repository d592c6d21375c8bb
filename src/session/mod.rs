//! YAML editor component
//!
//! [`YamlEditor`] owns at most one live session: an editor surface, its text
//! model and the synthetic path the session's schema is associated with.
//! Rendering with mountable props creates the session; `unmount` (or drop)
//! tears it down. While a session is live, content edits are forwarded to the
//! language service, cursor moves rebuild the breadcrumbs and marker batches
//! rebuild the problems list.

pub mod theme;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::runtime::Handle;

use crate::editor::{
    EditorFactory, EditorOptions, EditorSurface, MountTarget, Subscription, TextModel,
};
use crate::environment::Environment;
use crate::error::SessionError;
use crate::models::{DocumentUri, EditorProps, Position, SyntheticPath};
use crate::services::breadcrumbs::{render_breadcrumbs, symbol_path};
use crate::services::language::LanguageService;
use crate::services::problems::{Validation, project, render_problems};
use crate::view::{ClickAction, Element, Layout, Region};

use theme::{ColorSchemeSource, SystemColorScheme, resolve_theme};

pub const LANGUAGE_ID: &str = "yaml";

struct Session {
    path: SyntheticPath,
    uri: DocumentUri,
    editor: Arc<dyn EditorSurface>,
    model: Arc<dyn TextModel>,
    subscriptions: Vec<Subscription>,
    alive: Arc<AtomicBool>,
}

impl Session {
    fn dispose(self, env: &Environment) {
        self.alive.store(false, Ordering::Release);
        for subscription in self.subscriptions {
            subscription.dispose();
        }
        self.editor.dispose();
        self.model.dispose();
        env.release(self.path.file_match());
        env.language_service().close_document(&self.uri);
        tracing::debug!("Session {} disposed", self.path);
    }
}

pub struct YamlEditor {
    env: Arc<Environment>,
    factory: Arc<dyn EditorFactory>,
    color_scheme: Arc<dyn ColorSchemeSource>,
    layout: Layout,
    target: Option<MountTarget>,
    session: Option<Session>,
}

impl YamlEditor {
    pub fn new(env: Arc<Environment>, factory: Arc<dyn EditorFactory>) -> Self {
        Self {
            env,
            factory,
            color_scheme: Arc::new(SystemColorScheme::default()),
            layout: Layout::new(),
            target: None,
            session: None,
        }
    }

    pub fn with_color_scheme(mut self, source: Arc<dyn ColorSchemeSource>) -> Self {
        self.color_scheme = source;
        self
    }

    /// Provide the element the editor surface is created in
    pub fn attach(&mut self, target: MountTarget) {
        self.target = Some(target);
    }

    /// Remove the mount target. A live session is torn down with it.
    pub fn detach(&mut self) {
        self.unmount();
        self.target = None;
    }

    /// Reconcile with `props` and return the current view.
    ///
    /// The first render with a value, a schema and a mount target creates the
    /// session. Later renders only re-apply the theme.
    pub fn render(&mut self, props: &EditorProps) -> Element {
        if let Some(session) = &self.session {
            self.apply_theme(session, props);
        } else if props.is_mountable() {
            match self.create_session(props) {
                Ok(session) => self.session = Some(session),
                Err(e) => tracing::error!("Failed to create YAML editor: {}", e),
            }
        }
        self.layout.render(&props.style)
    }

    /// Tear down the live session and empty both derived lists
    pub fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            session.dispose(&self.env);
            self.layout.breadcrumbs().clear();
            self.layout.problems().clear();
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Run the action attached to a breadcrumb or problem entry
    pub fn activate(&self, action: ClickAction) {
        let Some(session) = &self.session else {
            return;
        };
        match action {
            ClickAction::Reveal { position } => {
                session.editor.set_position(position);
                session.editor.focus();
            }
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn editor(&self) -> Option<Arc<dyn EditorSurface>> {
        self.session.as_ref().map(|s| Arc::clone(&s.editor))
    }

    /// URI of the live session's document
    pub fn document_uri(&self) -> Option<&DocumentUri> {
        self.session.as_ref().map(|s| &s.uri)
    }

    fn theme(&self, props: &EditorProps) -> String {
        resolve_theme(props.theme.as_deref(), self.color_scheme.color_scheme())
    }

    fn apply_theme(&self, session: &Session, props: &EditorProps) {
        let theme = self.theme(props);
        let mut options = session.editor.options();
        if options.theme != theme {
            options.theme = theme;
            session.editor.update_options(&options);
        }
    }

    fn create_session(&self, props: &EditorProps) -> Result<Session, SessionError> {
        let target = self.target.as_ref().ok_or(SessionError::MountTargetMissing)?;
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        let value = props.value.as_deref().unwrap_or_default();

        let path = SyntheticPath::generate();
        let uri = path.uri();
        self.env.associate(&props.schema_uri, path.file_match());

        let model = match self.factory.create_model(value, LANGUAGE_ID, &uri) {
            Ok(model) => model,
            Err(e) => {
                self.env.release(path.file_match());
                return Err(e);
            }
        };

        let options = EditorOptions {
            read_only: props.read_only,
            theme: self.theme(props),
            automatic_layout: true,
        };
        let editor = match self
            .factory
            .create_editor(target, Arc::clone(&model), options)
        {
            Ok(editor) => editor,
            Err(e) => {
                model.dispose();
                self.env.release(path.file_match());
                return Err(e);
            }
        };

        let alive = Arc::new(AtomicBool::new(true));
        let service = self.env.language_service();
        let wiring = Wiring {
            uri: uri.clone(),
            alive: Arc::clone(&alive),
            service: Arc::downgrade(service),
        };

        let subscriptions = vec![
            editor.on_did_change_content(wiring.content_listener(&editor, props)),
            editor.on_did_change_cursor_position(
                wiring.cursor_listener(runtime, self.layout.breadcrumbs().clone()),
            ),
            service.on_did_change_markers(
                wiring.marker_listener(self.layout.problems().clone(), props),
            ),
        ];

        service.open_document(&uri, LANGUAGE_ID, value);
        tracing::info!("YAML editor mounted on {} ({})", target.id, path);

        Ok(Session {
            path,
            uri,
            editor,
            model,
            subscriptions,
            alive,
        })
    }
}

impl Drop for YamlEditor {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// State shared by the three session listeners
struct Wiring {
    uri: DocumentUri,
    alive: Arc<AtomicBool>,
    service: Weak<dyn LanguageService>,
}

impl Wiring {
    fn content_listener(
        &self,
        editor: &Arc<dyn EditorSurface>,
        props: &EditorProps,
    ) -> Arc<dyn Fn(&()) + Send + Sync> {
        let editor = Arc::downgrade(editor);
        let service = self.service.clone();
        let uri = self.uri.clone();
        let on_change = props.on_change.clone();

        Arc::new(move |_: &()| {
            let Some(editor) = editor.upgrade() else {
                return;
            };
            let value = editor.value();
            if let Some(service) = service.upgrade() {
                service.update_document(&uri, &value);
            }
            if let Some(on_change) = &on_change {
                on_change(&value);
            }
        })
    }

    fn cursor_listener(
        &self,
        runtime: Handle,
        breadcrumbs: Region,
    ) -> Arc<dyn Fn(&Position) + Send + Sync> {
        let service = self.service.clone();
        let uri = self.uri.clone();
        let alive = Arc::clone(&self.alive);

        Arc::new(move |position: &Position| {
            let position = *position;
            let Some(service) = service.upgrade() else {
                return;
            };
            let uri = uri.clone();
            let alive = Arc::clone(&alive);
            let breadcrumbs = breadcrumbs.clone();

            runtime.spawn(async move {
                let symbols = match service.document_symbols(&uri).await {
                    Ok(symbols) => symbols,
                    Err(e) => {
                        tracing::warn!("Outline request for {} failed: {}", uri, e);
                        return;
                    }
                };
                let crumbs = render_breadcrumbs(symbol_path(&symbols, position));
                if !breadcrumbs.replace_children_if(&alive, crumbs) {
                    tracing::trace!("Outline for {} arrived after teardown", uri);
                }
            });
        })
    }

    fn marker_listener(
        &self,
        problems: Region,
        props: &EditorProps,
    ) -> Arc<dyn Fn(&[DocumentUri]) + Send + Sync> {
        let service = self.service.clone();
        let uri = self.uri.clone();
        let alive = Arc::clone(&self.alive);
        let on_error = props.on_validation_error.clone();
        let on_success = props.on_validation_success.clone();

        Arc::new(move |changed: &[DocumentUri]| {
            if !alive.load(Ordering::Acquire) || !changed.contains(&uri) {
                return;
            }
            let Some(service) = service.upgrade() else {
                return;
            };

            let list = project(&service.markers(&uri));
            if !problems.replace_children_if(&alive, render_problems(&list)) {
                return;
            }

            let callback = match list.outcome() {
                Validation::Failed => &on_error,
                Validation::Passed => &on_success,
            };
            if let Some(callback) = callback {
                callback();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{BufferEditorFactory, ListenerSet};
    use crate::environment::DiagnosticsOptions;
    use crate::error::LspError;
    use crate::models::{Marker, Symbol};
    use crate::services::language::MarkerListener;
    use crate::view::BREADCRUMBS_ID;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use theme::{ColorScheme, DARK_THEME, LIGHT_THEME};

    #[derive(Default)]
    struct QuietService {
        opened: Mutex<Vec<DocumentUri>>,
        closed: Mutex<Vec<DocumentUri>>,
        listeners: ListenerSet<[DocumentUri]>,
    }

    #[async_trait]
    impl LanguageService for QuietService {
        fn configure(&self, _: &DiagnosticsOptions) {}
        fn open_document(&self, uri: &DocumentUri, _: &str, _: &str) {
            self.opened.lock().push(uri.clone());
        }
        fn update_document(&self, _: &DocumentUri, _: &str) {}
        fn close_document(&self, uri: &DocumentUri) {
            self.closed.lock().push(uri.clone());
        }
        async fn document_symbols(&self, _: &DocumentUri) -> Result<Vec<Symbol>, LspError> {
            Ok(Vec::new())
        }
        fn markers(&self, _: &DocumentUri) -> Vec<Marker> {
            Vec::new()
        }
        fn on_did_change_markers(&self, listener: MarkerListener) -> Subscription {
            self.listeners.add(listener)
        }
    }

    fn component(
        scheme: ColorScheme,
    ) -> (YamlEditor, Arc<QuietService>, Arc<BufferEditorFactory>) {
        let service = Arc::new(QuietService::default());
        let env = Environment::new(service.clone(), DiagnosticsOptions::default());
        let factory = Arc::new(BufferEditorFactory::new());
        let editor = YamlEditor::new(env, factory.clone()).with_color_scheme(Arc::new(scheme));
        (editor, service, factory)
    }

    #[tokio::test]
    async fn test_unmountable_props_stay_uninitialized() {
        let (mut component, service, factory) = component(ColorScheme::Light);
        component.attach(MountTarget::new("host"));

        component.render(&EditorProps::default());
        component.render(&EditorProps::new("a: 1", ""));
        assert!(!component.is_active());
        assert_eq!(factory.editors_created(), 0);
        assert!(service.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_mount_target_retries_later() {
        let (mut component, _service, factory) = component(ColorScheme::Light);
        let props = EditorProps::new("a: 1", "https://example.com/s.json");

        component.render(&props);
        assert!(!component.is_active());

        component.attach(MountTarget::new("host"));
        component.render(&props);
        assert!(component.is_active());
        assert_eq!(factory.editors_created(), 1);
    }

    #[test]
    fn test_no_runtime_is_a_creation_failure() {
        let (mut component, service, factory) = component(ColorScheme::Light);
        component.attach(MountTarget::new("host"));

        component.render(&EditorProps::new("a: 1", "https://example.com/s.json"));
        assert!(!component.is_active());
        assert_eq!(factory.editors_created(), 0);
        assert!(service.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn test_theme_follows_scheme_and_explicit_override() {
        let (mut component, _service, _factory) = component(ColorScheme::Dark);
        component.attach(MountTarget::new("host"));
        let props = EditorProps::new("a: 1", "https://example.com/s.json");

        component.render(&props);
        let editor = component.editor().unwrap();
        assert_eq!(editor.options().theme, DARK_THEME);

        component.render(&props.clone().with_theme(LIGHT_THEME));
        assert_eq!(editor.options().theme, LIGHT_THEME);
    }

    #[tokio::test]
    async fn test_unmount_closes_document() {
        let (mut component, service, factory) = component(ColorScheme::Light);
        component.attach(MountTarget::new("host"));
        component.render(&EditorProps::new("a: 1", "https://example.com/s.json"));

        let uri = component.document_uri().cloned().unwrap();
        assert!(uri.as_str().ends_with(".yaml"));
        assert_eq!(service.listeners.len(), 1);

        component.unmount();
        assert!(!component.is_active());
        assert_eq!(*service.closed.lock(), vec![uri]);
        assert!(service.listeners.is_empty());
        assert!(factory.live_editors().is_empty());
        assert!(factory.live_models().is_empty());
    }

    #[tokio::test]
    async fn test_render_tree() {
        let (mut component, _service, _factory) = component(ColorScheme::Light);
        component.attach(MountTarget::new("host"));
        let root = component.render(&EditorProps::new("a: 1", "https://example.com/s.json"));
        assert!(root.find_by_id(BREADCRUMBS_ID).is_some());
    }
}
