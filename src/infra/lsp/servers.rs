//! Launch settings and install detection for yaml-language-server

use std::process::Command;

use serde::Serialize;

use crate::models::config::LspConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    /// Shown when the command cannot be spawned
    pub install_hint: String,
    pub version_arg: &'static str,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_config(&LspConfig::default())
    }
}

impl ServerConfig {
    pub const NAME: &'static str = "yaml-language-server";

    pub fn from_config(config: &LspConfig) -> Self {
        Self {
            name: Self::NAME.to_string(),
            command: config.command.clone(),
            args: config.args.clone(),
            install_hint: "npm install -g yaml-language-server".to_string(),
            version_arg: "--version",
        }
    }

    pub fn is_installed(&self) -> bool {
        let locator = if cfg!(windows) { "where" } else { "which" };
        if Command::new(locator)
            .arg(&self.command)
            .output()
            .is_ok_and(|output| output.status.success())
        {
            return true;
        }

        // Absolute paths and shims `which` misses
        Command::new(&self.command)
            .arg(self.version_arg)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .is_ok()
    }

    /// Get installed version (if available)
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.command)
            .arg(self.version_arg)
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let text = if stdout.trim().is_empty() {
            stderr.to_string()
        } else {
            stdout.to_string()
        };

        text.lines()
            .find(|line| !line.trim().is_empty())
            .map(|s| s.trim().to_string())
    }

    pub fn health(&self) -> ServerHealth {
        let installed = self.is_installed();
        ServerHealth {
            name: self.name.clone(),
            command: self.command.clone(),
            installed,
            version: if installed { self.version() } else { None },
            install_instruction: self.install_hint.clone(),
        }
    }
}

/// Server health check result
#[derive(Debug, Clone, Serialize)]
pub struct ServerHealth {
    pub name: String,
    pub command: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub install_instruction: String,
}
