//! Symbol model definitions
//!
//! Structural symbols of a YAML document as reported by the language service.

use serde::{Deserialize, Serialize};

use super::position::{Position, Range};

/// A structural element of the document (mapping key, sequence, scalar...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    #[serde(default)]
    pub detail: String,
    pub kind: SymbolKind,
    pub range: Range,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Symbol>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, range: Range) -> Self {
        Self {
            name: name.into(),
            detail: String::new(),
            kind,
            range,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Symbol>) -> Self {
        self.children = children;
        self
    }

    pub fn start(&self) -> Position {
        self.range.start
    }
}

/// Symbol classification (aligned with LSP SymbolKind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
}

impl SymbolKind {
    /// Sequences. yaml-language-server reports these as `Array`.
    pub fn is_array_like(&self) -> bool {
        matches!(self, Self::Array)
    }

    /// Mappings. yaml-language-server reports these as `Module`; other
    /// servers use `Object`.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Self::Module | Self::Object)
    }
}
