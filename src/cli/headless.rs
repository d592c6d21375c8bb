//! A YAML editor mounted without a host UI
//!
//! Commands drive the same component a host would, over the buffer-backed
//! editor, and read the derived regions back.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::editor::{BufferEditorFactory, MountTarget};
use crate::environment::Environment;
use crate::models::{EditorProps, Position};
use crate::services::problems::{ProblemList, Validation, project};
use crate::session::YamlEditor;
use crate::session::theme::ColorSchemeSource;
use crate::view::{EDITOR_ID, Element};

pub struct HeadlessPane {
    env: Arc<Environment>,
    component: YamlEditor,
    props: EditorProps,
    validations: mpsc::UnboundedReceiver<Validation>,
}

impl HeadlessPane {
    pub fn mount(
        env: Arc<Environment>,
        color_scheme: Arc<dyn ColorSchemeSource>,
        text: &str,
        schema_uri: &str,
    ) -> Result<Self> {
        let (tx, validations) = mpsc::unbounded_channel();
        let failed = tx.clone();
        let props = EditorProps::new(text, schema_uri)
            .on_validation_error(move || {
                let _ = failed.send(Validation::Failed);
            })
            .on_validation_success(move || {
                let _ = tx.send(Validation::Passed);
            });

        let mut component = YamlEditor::new(Arc::clone(&env), Arc::new(BufferEditorFactory::new()))
            .with_color_scheme(color_scheme);
        component.attach(MountTarget::new(EDITOR_ID));
        component.render(&props);

        if !component.is_active() {
            bail!("Failed to mount the YAML editor");
        }
        Ok(Self {
            env,
            component,
            props,
            validations,
        })
    }

    /// Outcome of the first validation pass
    pub async fn wait_validation(&mut self, wait: Duration) -> Result<Validation> {
        match timeout(wait, self.validations.recv()).await {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => bail!("Validation callbacks were dropped"),
            Err(_) => bail!(
                "No validation result within {}s. Is the schema reachable?",
                wait.as_secs()
            ),
        }
    }

    pub fn problems(&self) -> ProblemList {
        match self.component.document_uri() {
            Some(uri) => project(&self.env.language_service().markers(uri)),
            None => ProblemList::default(),
        }
    }

    /// Move the cursor and wait for the breadcrumbs to be rebuilt
    pub async fn breadcrumbs_at(&self, position: Position, wait: Duration) -> Result<Vec<Element>> {
        let editor = self
            .component
            .editor()
            .ok_or_else(|| anyhow!("Editor is not mounted"))?;
        let region = self.component.layout().breadcrumbs();
        let mut revisions = region.subscribe();

        editor.set_position(position);
        match timeout(wait, revisions.changed()).await {
            Ok(Ok(())) => Ok(region.children()),
            Ok(Err(_)) => bail!("Breadcrumbs region closed"),
            Err(_) => bail!("No outline within {}s", wait.as_secs()),
        }
    }

    pub fn html(&mut self) -> String {
        self.component.render(&self.props).to_html()
    }

    pub fn unmount(&mut self) {
        self.component.unmount();
    }
}
