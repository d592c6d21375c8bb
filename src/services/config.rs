//! Configuration service for yamlpane

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::models::config::PaneConfig;

#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn load(&self, global_only: bool) -> Result<PaneConfig, ConfigError>;
    fn config_path(&self, global: bool) -> PathBuf;
    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError>;
}

pub struct DefaultConfigService {
    root: PathBuf,
    global_path: PathBuf,
}

impl DefaultConfigService {
    pub fn new(root: &Path) -> Self {
        Self::with_global_path(root, Self::global_config_path())
    }

    pub fn with_global_path(root: &Path, global_path: PathBuf) -> Self {
        Self {
            root: root.to_path_buf(),
            global_path,
        }
    }

    fn global_config_path() -> PathBuf {
        // XDG standard: ~/.config/yamlpane/config.toml
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yamlpane")
            .join("config.toml")
    }

    fn project_config_path(&self) -> PathBuf {
        self.root.join(".yamlpane").join("config.toml")
    }

    async fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
        if !path.exists() {
            return Ok(toml::Table::new());
        }
        let content = tokio::fs::read_to_string(path).await?;
        content
            .parse::<toml::Table>()
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    async fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let config = PaneConfig::default();
        let content =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigService for DefaultConfigService {
    async fn load(&self, global_only: bool) -> Result<PaneConfig, ConfigError> {
        let mut table = Self::load_table(&self.global_path).await?;
        if !global_only {
            let project = Self::load_table(&self.project_config_path()).await?;
            merge_tables(&mut table, project);
        }

        let config: PaneConfig = toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

        if global_only {
            Ok(config)
        } else {
            apply_env_overrides(config, |key| std::env::var(key).ok())
        }
    }

    fn config_path(&self, global: bool) -> PathBuf {
        if global {
            self.global_path.clone()
        } else {
            self.project_config_path()
        }
    }

    async fn init(&self, global: bool, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_path(global);

        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                key: "config".to_string(),
                message: format!(
                    "Config already exists: {}. Use --force to overwrite.",
                    path.display()
                ),
            });
        }

        Self::write_default_config(&path).await?;
        Ok(path)
    }
}

/// Project keys win; nested tables merge key by key
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn apply_env_overrides<F>(mut config: PaneConfig, lookup: F) -> Result<PaneConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("YAMLPANE_LSP_COMMAND") {
        config.lsp.command = val;
    }
    if let Some(val) = lookup("YAMLPANE_LSP_TIMEOUT") {
        config.lsp.timeout_secs = val.parse().map_err(|_| ConfigError::InvalidValue {
            key: "YAMLPANE_LSP_TIMEOUT".to_string(),
            message: format!("expected seconds, got '{}'", val),
        })?;
    }
    if let Some(val) = lookup("YAMLPANE_THEME") {
        config.appearance.theme = Some(val);
    }
    if let Some(val) = lookup("YAMLPANE_COLOR_SCHEME") {
        config.appearance.color_scheme = val;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> DefaultConfigService {
        DefaultConfigService::with_global_path(
            &dir.path().join("project"),
            dir.path().join("global").join("config.toml"),
        )
    }

    #[tokio::test]
    async fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = service(&dir).load(true).await.unwrap();
        assert_eq!(config.lsp.command, "yaml-language-server");
        assert_eq!(config.lsp.args, vec!["--stdio"]);
        assert_eq!(config.lsp.timeout_secs, 30);
        assert!(config.diagnostics.validate);
        assert_eq!(config.appearance.color_scheme, "auto");
    }

    #[tokio::test]
    async fn test_project_overrides_single_keys() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let global = service.config_path(true);
        std::fs::create_dir_all(global.parent().unwrap()).unwrap();
        std::fs::write(&global, "[lsp]\ncommand = \"/opt/yls\"\ntimeout_secs = 10\n").unwrap();

        let project = service.config_path(false);
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[lsp]\ntimeout_secs = 5\n[diagnostics]\nhover = false\n")
            .unwrap();

        let config = service.load(false).await.unwrap();
        assert_eq!(config.lsp.command, "/opt/yls");
        assert_eq!(config.lsp.timeout_secs, 5);
        assert!(!config.diagnostics.hover);
        assert!(config.diagnostics.validate);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let path = service.init(false, false).await.unwrap();
        assert!(path.exists());
        assert!(service.init(false, false).await.is_err());
        assert!(service.init(false, true).await.is_ok());

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("[lsp]"));
    }

    #[tokio::test]
    async fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let global = service.config_path(true);
        std::fs::create_dir_all(global.parent().unwrap()).unwrap();
        std::fs::write(&global, "[lsp\n").unwrap();

        let err = service.load(true).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref m) if m.contains("config.toml")));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("YAMLPANE_LSP_TIMEOUT", "7"),
            ("YAMLPANE_THEME", "hc-black"),
            ("YAMLPANE_LSP_COMMAND", "yls"),
        ]
        .into_iter()
        .collect();
        let config = apply_env_overrides(PaneConfig::default(), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.lsp.timeout_secs, 7);
        assert_eq!(config.lsp.command, "yls");
        assert_eq!(config.appearance.theme.as_deref(), Some("hc-black"));

        let bad = apply_env_overrides(PaneConfig::default(), |k| {
            (k == "YAMLPANE_LSP_TIMEOUT").then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }
}
