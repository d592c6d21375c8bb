//! yamlpane - schema-validated YAML editing panes
//!
//! Command-line front end that mounts the YAML editor headlessly against
//! yaml-language-server.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yamlpane::app::App;
use yamlpane::cli::{Cli, Commands};

fn main() {
    // Quiet by default so stdout stays machine-readable
    // Use RUST_LOG=yamlpane=debug for verbose output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamlpane=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!(
                r#"{{"success":false,"error":"Failed to create runtime: {}"}}"#,
                e
            );
            std::process::exit(1);
        }
    };

    match runtime.block_on(async_main()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // Errors are JSON like every other output
            let response = serde_json::json!({
                "success": false,
                "error": format!("{:#}", e)
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, e))
            );
            std::process::exit(2);
        }
    }
}

/// Returns `false` when the command completed but reported a failure
async fn async_main() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    let app = App::new()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;

    let result = execute_command(cli.command, &app).await;
    app.shutdown().await;
    result
}

async fn execute_command(command: Commands, app: &App) -> anyhow::Result<bool> {
    use yamlpane::cli::commands;

    match command {
        Commands::Check(args) => commands::check::execute(args, app).await,
        Commands::Breadcrumbs(args) => commands::breadcrumbs::execute(args, app).await.map(|_| true),
        Commands::Config(args) => commands::config::execute(args, app).await.map(|_| true),
        Commands::Doctor(args) => commands::doctor::execute(args, app).await,
    }
}
