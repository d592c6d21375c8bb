//! Check command - validate YAML files against a schema

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::headless::HeadlessPane;
use crate::services::problems::{Problem, Validation};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML files to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Schema URI (http(s) or file://)
    #[arg(short, long)]
    pub schema: String,
}

#[derive(Serialize)]
struct CheckResponse {
    valid: bool,
    files: Vec<FileReport>,
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    problems: Vec<Problem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn check_file(app: &App, path: &Path, schema: &str) -> Result<(Validation, Vec<Problem>)> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let env = app.environment().await?;
    let mut pane = HeadlessPane::mount(env, app.color_scheme(), &text, schema)?;
    let outcome = pane.wait_validation(crate::config::validation_wait()).await;
    let problems = pane.problems().entries;
    pane.unmount();
    Ok((outcome?, problems))
}

/// Returns whether every file passed validation
pub async fn execute(args: CheckArgs, app: &App) -> Result<bool> {
    let ctx = &app.output;

    let checks = args
        .files
        .iter()
        .map(|path| check_file(app, path, &args.schema));
    let results = futures::future::join_all(checks).await;

    let files: Vec<FileReport> = args
        .files
        .iter()
        .zip(results)
        .map(|(path, result)| {
            let file = ctx.relative_path(path);
            match result {
                Ok((outcome, problems)) => FileReport {
                    file,
                    valid: outcome == Validation::Passed,
                    problems,
                    error: None,
                },
                Err(e) => FileReport {
                    file,
                    valid: false,
                    problems: Vec::new(),
                    error: Some(format!("{:#}", e)),
                },
            }
        })
        .collect();

    let valid = files.iter().all(|f| f.valid);
    let response = CheckResponse { valid, files };
    ctx.print_report(valid, response);
    Ok(valid)
}
