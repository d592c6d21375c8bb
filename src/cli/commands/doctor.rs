//! Doctor command - language server health check

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::infra::lsp::protocol::ServerInfo;
use crate::infra::lsp::{HealthStatus, ServerHealth};

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Only look for the binary, do not start it
    #[arg(long)]
    pub offline: bool,
}

#[derive(Serialize)]
struct DoctorResponse {
    healthy: bool,
    server: ServerEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    handshake: Option<Handshake>,
}

#[derive(Serialize)]
struct ServerEntry {
    name: String,
    command: String,
    installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    install_command: Option<String>,
}

impl From<ServerHealth> for ServerEntry {
    fn from(health: ServerHealth) -> Self {
        Self {
            name: health.name,
            command: health.command,
            installed: health.installed,
            version: health.version,
            install_command: (!health.installed).then_some(health.install_instruction),
        }
    }
}

#[derive(Serialize)]
struct Handshake {
    status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_info: Option<ServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Handshake {
    fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

async fn handshake(app: &App) -> Handshake {
    match app.language_service().await {
        Ok(service) => {
            let client = service.client();
            Handshake {
                status: client.health_status().await,
                server_info: client.capabilities().await.and_then(|c| c.server_info),
                error: None,
            }
        }
        Err(e) => Handshake {
            status: HealthStatus::NotRunning,
            server_info: None,
            error: Some(e.to_string()),
        },
    }
}

pub async fn execute(args: DoctorArgs, app: &App) -> Result<bool> {
    let ctx = &app.output;

    let server = ServerEntry::from(app.server_config().health());
    let handshake = if server.installed && !args.offline {
        Some(handshake(app).await)
    } else {
        None
    };
    let healthy = server.installed && handshake.as_ref().is_none_or(Handshake::is_healthy);

    ctx.print_report(
        healthy,
        DoctorResponse {
            healthy,
            server,
            handshake,
        },
    );
    Ok(healthy)
}
