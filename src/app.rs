//! Application container for yamlpane

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::cli::OutputContext;
use crate::config;
use crate::environment::{self, DiagnosticsOptions, Environment};
use crate::error::LspError;
use crate::infra::lsp::ServerConfig;
use crate::models::config::PaneConfig;
use crate::services::config::{ConfigService, DefaultConfigService};
use crate::services::language::{LanguageService, LspLanguageService};
use crate::session::theme::SystemColorScheme;

pub struct App {
    pub(crate) output: OutputContext,
    pub(crate) config_service: Arc<dyn ConfigService>,
    pub(crate) config: PaneConfig,
    language: OnceCell<Arc<LspLanguageService>>,
}

impl App {
    pub async fn new() -> anyhow::Result<Self> {
        let root = std::env::current_dir()?;

        tracing::debug!("Initializing yamlpane at {:?}", root);

        let output = OutputContext::new(root.clone());
        let config_service = Arc::new(DefaultConfigService::new(&root));
        let config = match config_service.load(false).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default configuration: {}", e);
                PaneConfig::default()
            }
        };

        // Request timeouts read by the client
        config::init(&config);

        Ok(Self {
            output,
            config_service,
            config,
            language: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &PaneConfig {
        &self.config
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::from_config(&self.config.lsp)
    }

    pub fn color_scheme(&self) -> Arc<SystemColorScheme> {
        Arc::new(SystemColorScheme::new(&self.config.appearance.color_scheme))
    }

    /// Start the language server on first use
    pub async fn language_service(&self) -> Result<&Arc<LspLanguageService>, LspError> {
        let server = self.server_config();
        self.language
            .get_or_try_init(|| async {
                let service = LspLanguageService::start(&server).await?;
                tracing::info!("{} started", server.name);
                Ok::<_, LspError>(service)
            })
            .await
    }

    /// Install the environment over the running language server
    pub async fn environment(&self) -> anyhow::Result<Arc<Environment>> {
        let service: Arc<dyn LanguageService> = self.language_service().await?.clone();
        Ok(environment::initialize(
            service,
            DiagnosticsOptions::from(&self.config.diagnostics),
        ))
    }

    /// Stop the language server if it was started
    pub async fn shutdown(&self) {
        if let Some(service) = self.language.get() {
            service.shutdown().await;
        }
    }
}
