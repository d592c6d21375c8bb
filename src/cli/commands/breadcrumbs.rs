//! Breadcrumbs command - structural path under a cursor position

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::headless::HeadlessPane;
use crate::cli::position::parse_position;
use crate::models::Position;
use crate::view::{ClickAction, Element};

#[derive(Args, Debug)]
pub struct BreadcrumbsArgs {
    /// YAML file
    pub file: PathBuf,

    /// Schema URI (http(s) or file://)
    #[arg(short, long)]
    pub schema: String,

    /// Cursor position, `line[:column]` (1-indexed)
    #[arg(long)]
    pub at: String,

    /// Print the rendered editor box as HTML
    #[arg(long)]
    pub html: bool,
}

#[derive(Serialize)]
struct BreadcrumbsResponse {
    file: String,
    position: Position,
    path: Vec<Crumb>,
}

#[derive(Serialize)]
struct Crumb {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reveal: Option<Position>,
}

impl From<Element> for Crumb {
    fn from(element: Element) -> Self {
        let reveal = element.on_click.map(|action| match action {
            ClickAction::Reveal { position } => position,
        });
        Self {
            name: element.text.unwrap_or_default(),
            detail: element.title.filter(|t| !t.is_empty()),
            classes: element.classes,
            reveal,
        }
    }
}

pub async fn execute(args: BreadcrumbsArgs, app: &App) -> Result<()> {
    let ctx = &app.output;
    let position = parse_position(&args.at)?;
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let env = app.environment().await?;
    let mut pane = HeadlessPane::mount(env, app.color_scheme(), &text, &args.schema)?;
    let crumbs = pane
        .breadcrumbs_at(position, crate::config::timeout_for("textDocument/documentSymbol"))
        .await;

    let result = crumbs.map(|crumbs| {
        if args.html {
            ctx.emit(&pane.html());
        } else {
            ctx.print_success_flat(BreadcrumbsResponse {
                file: ctx.relative_path(&args.file),
                position,
                path: crumbs.into_iter().map(Crumb::from).collect(),
            });
        }
    });
    pane.unmount();
    result
}
