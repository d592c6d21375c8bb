//! Editor coordinates
//!
//! Editor-facing positions are 1-based (line and column), the way the editing
//! surface reports its cursor. The LSP layer converts at its boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cursor position (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Convert a 0-indexed LSP position
    pub fn from_lsp(line: u32, character: u32) -> Self {
        Self {
            line: line + 1,
            column: character + 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    /// Parse `line:column` (both 1-based)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid position '{}'. Expected <line>:<column>", s))?;

        let line: u32 = line
            .trim()
            .parse()
            .map_err(|_| format!("Invalid line number: '{}'", line))?;
        let column: u32 = column
            .trim()
            .parse()
            .map_err(|_| format!("Invalid column number: '{}'", column))?;

        if line == 0 || column == 0 {
            return Err("Line and column are 1-based".to_string());
        }

        Ok(Self::new(line, column))
    }
}

/// Source range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn from_coords(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self::new(
            Position::new(start_line, start_column),
            Position::new(end_line, end_column),
        )
    }

    /// Boundary-inclusive containment: a position exactly on `start` or `end`
    /// is inside the range.
    pub fn contains_position(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
