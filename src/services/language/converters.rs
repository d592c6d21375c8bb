//! Type conversion functions for LSP responses

use serde_json::Value;

use crate::error::LspError;
use crate::infra::lsp::protocol::{
    DocumentSymbol, LspDiagnostic, LspRange, LspSymbolKind, SymbolInformation,
};
use crate::models::{DocumentUri, Marker, MarkerSeverity, Position, Range, Symbol, SymbolKind};

pub(super) fn convert_symbol_kind(kind: LspSymbolKind) -> SymbolKind {
    use LspSymbolKind as LspKind;
    match kind {
        LspKind::File => SymbolKind::File,
        LspKind::Module => SymbolKind::Module,
        LspKind::Namespace => SymbolKind::Namespace,
        LspKind::Package => SymbolKind::Package,
        LspKind::Class => SymbolKind::Class,
        LspKind::Method => SymbolKind::Method,
        LspKind::Property => SymbolKind::Property,
        LspKind::Field => SymbolKind::Field,
        LspKind::Constructor => SymbolKind::Constructor,
        LspKind::Enum => SymbolKind::Enum,
        LspKind::Interface => SymbolKind::Interface,
        LspKind::Function => SymbolKind::Function,
        LspKind::Variable => SymbolKind::Variable,
        LspKind::Constant => SymbolKind::Constant,
        LspKind::String => SymbolKind::String,
        LspKind::Number => SymbolKind::Number,
        LspKind::Boolean => SymbolKind::Boolean,
        LspKind::Array => SymbolKind::Array,
        LspKind::Object => SymbolKind::Object,
        LspKind::Key => SymbolKind::Key,
        LspKind::Null => SymbolKind::Null,
        LspKind::EnumMember => SymbolKind::EnumMember,
        LspKind::Struct => SymbolKind::Struct,
        LspKind::Event => SymbolKind::Event,
        LspKind::Operator => SymbolKind::Operator,
        LspKind::TypeParameter => SymbolKind::TypeParameter,
    }
}

/// 0-indexed wire range to 1-indexed editor range
pub(super) fn convert_range(range: &LspRange) -> Range {
    Range::new(
        Position::from_lsp(range.start.line, range.start.character),
        Position::from_lsp(range.end.line, range.end.character),
    )
}

pub(super) fn convert_document_symbols(symbols: Vec<DocumentSymbol>) -> Vec<Symbol> {
    symbols
        .into_iter()
        .map(|doc_sym| {
            let children = convert_document_symbols(doc_sym.children.unwrap_or_default());
            Symbol::new(
                doc_sym.name,
                convert_symbol_kind(doc_sym.kind),
                convert_range(&doc_sym.range),
            )
            .with_detail(doc_sym.detail.unwrap_or_default())
            .with_children(children)
        })
        .collect()
}

/// Flat symbols become top-level siblings in server order
pub(super) fn convert_symbol_information(symbols: Vec<SymbolInformation>) -> Vec<Symbol> {
    symbols
        .into_iter()
        .map(|s| {
            let symbol = Symbol::new(
                s.name,
                convert_symbol_kind(s.kind),
                convert_range(&s.location.range),
            );
            match s.container_name {
                Some(container) if !container.is_empty() => symbol.with_detail(container),
                _ => symbol,
            }
        })
        .collect()
}

/// Decode a `textDocument/documentSymbol` result of either shape
pub(super) fn parse_document_symbols(result: Value) -> Result<Vec<Symbol>, LspError> {
    let is_flat = result
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(|first| first.get("location").is_some());

    if result.is_null() {
        return Ok(Vec::new());
    }

    if is_flat {
        let symbols: Vec<SymbolInformation> =
            serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))?;
        Ok(convert_symbol_information(symbols))
    } else {
        let symbols: Vec<DocumentSymbol> =
            serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))?;
        Ok(convert_document_symbols(symbols))
    }
}

pub(super) fn convert_diagnostics(uri: &DocumentUri, diagnostics: Vec<LspDiagnostic>) -> Vec<Marker> {
    diagnostics
        .into_iter()
        .map(|d| {
            let range = convert_range(&d.range);
            let marker = Marker::new(
                uri.clone(),
                MarkerSeverity::from_lsp(d.severity.map(|s| s as u8)),
                d.message,
                range.start,
            )
            .with_end(range.end);
            match d.source {
                Some(source) => marker.with_source(source),
                None => marker,
            }
        })
        .collect()
}
