//! Configuration model for yamlpane

use serde::{Deserialize, Serialize};

/// yamlpane configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaneConfig {
    #[serde(default)]
    pub lsp: LspConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub appearance: AppearanceConfig,
}

/// Language server process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LspConfig {
    #[serde(default = "defaults::command")]
    pub command: String,

    #[serde(default = "defaults::args")]
    pub args: Vec<String>,

    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// How long the CLI waits for the first validation pass
    #[serde(default = "defaults::validation_wait_secs")]
    pub validation_wait_secs: u64,
}

impl Default for LspConfig {
    fn default() -> Self {
        Self {
            command: defaults::command(),
            args: defaults::args(),
            timeout_secs: defaults::timeout_secs(),
            validation_wait_secs: defaults::validation_wait_secs(),
        }
    }
}

/// Language-service feature switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default = "defaults::enabled")]
    pub validate: bool,

    #[serde(default = "defaults::enabled")]
    pub enable_schema_request: bool,

    #[serde(default = "defaults::enabled")]
    pub format: bool,

    #[serde(default = "defaults::enabled")]
    pub hover: bool,

    #[serde(default = "defaults::enabled")]
    pub completion: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            validate: true,
            enable_schema_request: true,
            format: true,
            hover: true,
            completion: true,
        }
    }
}

/// Look and feel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Explicit theme; wins over the color scheme
    #[serde(default)]
    pub theme: Option<String>,

    /// `auto`, `dark` or `light`
    #[serde(default = "defaults::color_scheme")]
    pub color_scheme: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: None,
            color_scheme: defaults::color_scheme(),
        }
    }
}

mod defaults {
    pub fn command() -> String {
        "yaml-language-server".to_string()
    }
    pub fn args() -> Vec<String> {
        vec!["--stdio".to_string()]
    }
    pub fn timeout_secs() -> u64 {
        30
    }
    pub fn validation_wait_secs() -> u64 {
        20
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn color_scheme() -> String {
        "auto".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaneConfig::default();
        assert_eq!(config.lsp.command, "yaml-language-server");
        assert_eq!(config.lsp.args, vec!["--stdio"]);
        assert_eq!(config.lsp.timeout_secs, 30);
        assert!(config.diagnostics.validate);
        assert!(config.diagnostics.enable_schema_request);
        assert_eq!(config.appearance.color_scheme, "auto");
        assert!(config.appearance.theme.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PaneConfig = toml::from_str(
            r#"
            [lsp]
            timeout_secs = 5

            [diagnostics]
            hover = false
            "#,
        )
        .unwrap();
        assert_eq!(config.lsp.timeout_secs, 5);
        assert_eq!(config.lsp.command, "yaml-language-server");
        assert!(!config.diagnostics.hover);
        assert!(config.diagnostics.completion);
    }
}
