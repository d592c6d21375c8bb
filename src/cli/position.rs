//! Cursor position parsing for CLI commands

use anyhow::{Result, bail};

use crate::models::Position;

/// Parse `line[:column]` (1-indexed). A missing column means column 1.
pub fn parse_position(input: &str) -> Result<Position> {
    let input = input.trim();
    if input.is_empty() {
        bail!("Position cannot be empty. Expected: line[:column]\nExample: 3:5");
    }

    let mut parts = input.splitn(2, ':');
    let line = parse_component(parts.next().unwrap_or_default(), "line")?;
    let column = match parts.next() {
        Some(column) => parse_component(column, "column")?,
        None => 1,
    };
    Ok(Position::new(line, column))
}

fn parse_component(value: &str, name: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(0) => bail!("Invalid {} number '0': positions are 1-indexed", name),
        Ok(n) => Ok(n),
        Err(_) => bail!(
            "Invalid {} number '{}': must be a positive integer (1-indexed)",
            name,
            value
        ),
    }
}
