//! Runtime settings shared by the client and the CLI

use std::sync::OnceLock;
use std::time::Duration;

use crate::models::config::PaneConfig;

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Request,
    Initialization,
    Shutdown,
}

impl OperationType {
    pub fn from_method(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialization,
            "shutdown" => Self::Shutdown,
            _ => Self::Request,
        }
    }

    fn base_multiplier(self) -> f64 {
        match self {
            Self::Request => 1.0,
            // Server loads and compiles schemas during startup
            Self::Initialization => 2.0,
            Self::Shutdown => 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    base_timeout: Duration,
    pub validation_wait: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_timeout: Duration::from_secs(30),
            validation_wait: Duration::from_secs(20),
        }
    }
}

impl From<&PaneConfig> for RuntimeConfig {
    fn from(config: &PaneConfig) -> Self {
        Self {
            base_timeout: Duration::from_secs(config.lsp.timeout_secs),
            validation_wait: Duration::from_secs(config.lsp.validation_wait_secs),
        }
    }
}

impl RuntimeConfig {
    pub fn timeout_for(&self, method: &str) -> Duration {
        let multiplier = OperationType::from_method(method).base_multiplier();
        Duration::from_secs_f64(self.base_timeout.as_secs_f64() * multiplier)
    }
}

pub fn init(config: &PaneConfig) {
    let _ = CONFIG.set(RuntimeConfig::from(config));
}

pub fn timeout_for(method: &str) -> Duration {
    config().timeout_for(method)
}

pub fn validation_wait() -> Duration {
    config().validation_wait
}

fn config() -> RuntimeConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_calculation() {
        let config = RuntimeConfig::default();

        assert_eq!(
            config.timeout_for("textDocument/documentSymbol"),
            Duration::from_secs(30)
        );
        assert_eq!(config.timeout_for("initialize"), Duration::from_secs(60));
        assert_eq!(config.timeout_for("shutdown"), Duration::from_secs(15));
    }

    #[test]
    fn test_from_pane_config() {
        let mut pane = PaneConfig::default();
        pane.lsp.timeout_secs = 4;
        pane.lsp.validation_wait_secs = 2;

        let config = RuntimeConfig::from(&pane);
        assert_eq!(config.timeout_for("initialize"), Duration::from_secs(8));
        assert_eq!(config.validation_wait, Duration::from_secs(2));
    }

    #[test]
    fn test_operation_type_parsing() {
        assert_eq!(
            OperationType::from_method("textDocument/documentSymbol"),
            OperationType::Request
        );
        assert_eq!(
            OperationType::from_method("initialize"),
            OperationType::Initialization
        );
        assert_eq!(
            OperationType::from_method("shutdown"),
            OperationType::Shutdown
        );
    }
}
