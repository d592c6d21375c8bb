//! Process-wide language environment
//!
//! Holds the diagnostics options and schema registry shared by every editor
//! session, and pushes the effective option set to the language service
//! whenever it changes. Sessions add their own schema association on
//! creation and remove it on teardown; the global options set through
//! [`initialize`] sit underneath them.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::config::DiagnosticsConfig;
use crate::services::language::LanguageService;

static GLOBAL: OnceLock<Arc<Environment>> = OnceLock::new();

/// A schema and the documents it applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAssociation {
    pub uri: String,
    pub file_match: Vec<String>,
}

impl SchemaAssociation {
    pub fn new(uri: impl Into<String>, file_match: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            file_match: vec![file_match.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsOptions {
    pub validate: bool,
    /// Let the server fetch remote schemas itself
    pub enable_schema_request: bool,
    pub format: bool,
    pub hover: bool,
    pub completion: bool,
    #[serde(default)]
    pub schemas: Vec<SchemaAssociation>,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            validate: true,
            enable_schema_request: true,
            format: true,
            hover: true,
            completion: true,
            schemas: Vec::new(),
        }
    }
}

impl From<&DiagnosticsConfig> for DiagnosticsOptions {
    fn from(config: &DiagnosticsConfig) -> Self {
        Self {
            validate: config.validate,
            enable_schema_request: config.enable_schema_request,
            format: config.format,
            hover: config.hover,
            completion: config.completion,
            schemas: Vec::new(),
        }
    }
}

struct Registry {
    base: DiagnosticsOptions,
    /// One entry per live session, in creation order
    sessions: Vec<SchemaAssociation>,
}

impl Registry {
    fn effective(&self) -> DiagnosticsOptions {
        let mut options = self.base.clone();
        options.schemas.extend(self.sessions.iter().cloned());
        options
    }
}

pub struct Environment {
    service: Arc<dyn LanguageService>,
    registry: Mutex<Registry>,
}

impl Environment {
    /// A private environment, not installed globally
    pub fn new(service: Arc<dyn LanguageService>, options: DiagnosticsOptions) -> Arc<Self> {
        let env = Arc::new(Self {
            service,
            registry: Mutex::new(Registry {
                base: options,
                sessions: Vec::new(),
            }),
        });
        env.push(&env.registry.lock());
        env
    }

    pub fn language_service(&self) -> &Arc<dyn LanguageService> {
        &self.service
    }

    /// Replace the global options. Session associations are kept.
    pub fn set_diagnostics_options(&self, options: DiagnosticsOptions) {
        let mut registry = self.registry.lock();
        registry.base = options;
        self.push(&registry);
    }

    /// Apply `schema_uri` to documents matching `file_match`
    pub fn associate(&self, schema_uri: &str, file_match: &str) {
        let mut registry = self.registry.lock();
        registry
            .sessions
            .retain(|a| a.file_match.iter().all(|m| m != file_match));
        registry
            .sessions
            .push(SchemaAssociation::new(schema_uri, file_match));
        tracing::debug!("Associated schema {} with {}", schema_uri, file_match);
        self.push(&registry);
    }

    /// Drop the association registered for `file_match`, if any
    pub fn release(&self, file_match: &str) {
        let mut registry = self.registry.lock();
        let before = registry.sessions.len();
        registry
            .sessions
            .retain(|a| a.file_match.iter().all(|m| m != file_match));
        if registry.sessions.len() != before {
            tracing::debug!("Released schema association for {}", file_match);
            self.push(&registry);
        }
    }

    pub fn effective_options(&self) -> DiagnosticsOptions {
        self.registry.lock().effective()
    }

    /// Number of live session associations
    pub fn association_count(&self) -> usize {
        self.registry.lock().sessions.len()
    }

    // Called with the registry locked so pushes reach the service in order.
    fn push(&self, registry: &Registry) {
        self.service.configure(&registry.effective());
    }
}

/// Install the process-wide environment.
///
/// The first call decides the language service. Later calls replace the
/// global options for every live session and keep the existing service.
pub fn initialize(service: Arc<dyn LanguageService>, options: DiagnosticsOptions) -> Arc<Environment> {
    let mut installed = false;
    let env = GLOBAL.get_or_init(|| {
        installed = true;
        Environment::new(service, options.clone())
    });

    if installed {
        tracing::debug!("Language environment initialized");
    } else {
        env.set_diagnostics_options(options);
    }
    Arc::clone(env)
}
