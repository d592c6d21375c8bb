//! Scripted language service for integration tests
//!
//! Validates one rule (`foo` must be a number) for documents associated with
//! [`FOO_NUMBER_SCHEMA`], builds a naive indentation outline, and publishes
//! markers from a spawned task like a real server would.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use yamlpane::editor::{ListenerSet, Subscription};
use yamlpane::environment::DiagnosticsOptions;
use yamlpane::error::LspError;
use yamlpane::models::{DocumentUri, Marker, MarkerSeverity, Position, Range, Symbol, SymbolKind};
use yamlpane::services::{LanguageService, MarkerListener};

pub const FOO_NUMBER_SCHEMA: &str = "https://example.com/schemas/foo-number.json";
pub const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct State {
    options: DiagnosticsOptions,
    documents: HashMap<DocumentUri, String>,
    markers: HashMap<DocumentUri, Vec<Marker>>,
    opened: Vec<DocumentUri>,
    closed: Vec<DocumentUri>,
    configures: usize,
    symbol_requests: usize,
    fail_symbols: bool,
}

struct Inner {
    state: Mutex<State>,
    listeners: ListenerSet<[DocumentUri]>,
    // `false` holds outline requests until released
    gate: watch::Sender<bool>,
}

#[derive(Clone)]
pub struct FakeLanguageService {
    inner: Arc<Inner>,
}

impl Default for FakeLanguageService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLanguageService {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                listeners: ListenerSet::new(),
                gate,
            }),
        }
    }

    pub fn hold_outlines(&self) {
        self.inner.gate.send_replace(false);
    }

    pub fn release_outlines(&self) {
        self.inner.gate.send_replace(true);
    }

    pub fn fail_outlines(&self, fail: bool) {
        self.inner.state.lock().fail_symbols = fail;
    }

    pub fn symbol_requests(&self) -> usize {
        self.inner.state.lock().symbol_requests
    }

    pub fn opened(&self) -> Vec<DocumentUri> {
        self.inner.state.lock().opened.clone()
    }

    pub fn closed(&self) -> Vec<DocumentUri> {
        self.inner.state.lock().closed.clone()
    }

    pub fn text(&self, uri: &DocumentUri) -> Option<String> {
        self.inner.state.lock().documents.get(uri).cloned()
    }

    pub fn options(&self) -> DiagnosticsOptions {
        self.inner.state.lock().options.clone()
    }

    pub fn configures(&self) -> usize {
        self.inner.state.lock().configures
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Publish a batch for `uri` as if the server sent it
    pub fn publish(&self, uri: &DocumentUri, markers: Vec<Marker>) {
        self.inner
            .state
            .lock()
            .markers
            .insert(uri.clone(), markers);
        self.inner.listeners.emit(std::slice::from_ref(uri));
    }

    fn schedule_validation(&self, uri: &DocumentUri) {
        let service = self.clone();
        let uri = uri.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let markers = {
                let state = service.inner.state.lock();
                let Some(text) = state.documents.get(&uri) else {
                    return;
                };
                if schema_for(&state.options, &uri).as_deref() == Some(FOO_NUMBER_SCHEMA) {
                    validate_foo_number(&uri, text)
                } else {
                    Vec::new()
                }
            };
            service.publish(&uri, markers);
        });
    }
}

fn schema_for(options: &DiagnosticsOptions, uri: &DocumentUri) -> Option<String> {
    let file = uri.as_str().rsplit('/').next()?;
    options
        .schemas
        .iter()
        .find(|a| a.file_match.iter().any(|m| m == file))
        .map(|a| a.uri.clone())
}

fn validate_foo_number(uri: &DocumentUri, text: &str) -> Vec<Marker> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let rest = line.trim_start().strip_prefix("foo:")?;
            let value = rest.trim();
            if value.parse::<f64>().is_ok() {
                return None;
            }
            let column = (line.len() - rest.trim_start().len()) as u32 + 1;
            let line_no = index as u32 + 1;
            Some(
                Marker::new(
                    uri.clone(),
                    MarkerSeverity::Error,
                    "Incorrect type. Expected \"number\".",
                    Position::new(line_no, column),
                )
                .with_end(Position::new(line_no, line.len() as u32 + 1)),
            )
        })
        .collect()
}

/// Indentation outline: `key:` lines become symbols, nested blocks children
pub fn outline(text: &str) -> Vec<Symbol> {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .unwrap_or(0);
    build(&lines, 0, lines.len(), indent)
}

fn build(lines: &[&str], from: usize, to: usize, indent: usize) -> Vec<Symbol> {
    let indent_of = |l: &str| l.len() - l.trim_start().len();
    let mut symbols = Vec::new();
    let mut i = from;
    while i < to {
        let line = lines[i];
        let trimmed = line.trim_start().trim_start_matches("- ");
        let own_indent = line.len() - trimmed.len();
        if line.trim().is_empty() || indent_of(line) != indent || !trimmed.contains(':') {
            i += 1;
            continue;
        }
        let (key, rest) = trimmed.split_once(':').unwrap();

        let mut end = i + 1;
        while end < to && (lines[end].trim().is_empty() || indent_of(lines[end]) > indent) {
            end += 1;
        }
        let last = end - 1;
        let range = Range::from_coords(
            i as u32 + 1,
            own_indent as u32 + 1,
            last as u32 + 1,
            lines[last].len() as u32 + 1,
        );

        let rest = rest.trim();
        let child_indent = (i + 1..end)
            .find(|&j| !lines[j].trim().is_empty())
            .map(|j| indent_of(lines[j]));
        let (kind, children) = match child_indent {
            Some(child) if rest.is_empty() => {
                let is_array = lines[i + 1..end]
                    .iter()
                    .any(|l| l.trim_start().starts_with("- "));
                let kind = if is_array { SymbolKind::Array } else { SymbolKind::Module };
                (kind, build(lines, i + 1, end, child))
            }
            _ if rest.parse::<f64>().is_ok() => (SymbolKind::Number, Vec::new()),
            _ => (SymbolKind::String, Vec::new()),
        };

        symbols.push(Symbol::new(key.trim(), kind, range).with_children(children));
        i = end;
    }
    symbols
}

#[async_trait]
impl LanguageService for FakeLanguageService {
    fn configure(&self, options: &DiagnosticsOptions) {
        let mut state = self.inner.state.lock();
        state.options = options.clone();
        state.configures += 1;
    }

    fn open_document(&self, uri: &DocumentUri, _language_id: &str, text: &str) {
        {
            let mut state = self.inner.state.lock();
            state.documents.insert(uri.clone(), text.to_string());
            state.opened.push(uri.clone());
        }
        self.schedule_validation(uri);
    }

    fn update_document(&self, uri: &DocumentUri, text: &str) {
        {
            let mut state = self.inner.state.lock();
            if !state.documents.contains_key(uri) {
                return;
            }
            state.documents.insert(uri.clone(), text.to_string());
        }
        self.schedule_validation(uri);
    }

    fn close_document(&self, uri: &DocumentUri) {
        let mut state = self.inner.state.lock();
        state.documents.remove(uri);
        state.markers.remove(uri);
        state.closed.push(uri.clone());
    }

    async fn document_symbols(&self, uri: &DocumentUri) -> Result<Vec<Symbol>, LspError> {
        let (text, fail) = {
            let mut state = self.inner.state.lock();
            state.symbol_requests += 1;
            (state.documents.get(uri).cloned(), state.fail_symbols)
        };

        let mut gate = self.inner.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| LspError::ServiceStopped)?;

        if fail {
            return Err(LspError::ServerError {
                code: -32603,
                message: "outline failed".to_string(),
            });
        }
        Ok(text.map(|t| outline(&t)).unwrap_or_default())
    }

    fn markers(&self, uri: &DocumentUri) -> Vec<Marker> {
        self.inner
            .state
            .lock()
            .markers
            .get(uri)
            .cloned()
            .unwrap_or_default()
    }

    fn on_did_change_markers(&self, listener: MarkerListener) -> Subscription {
        self.inner.listeners.add(listener)
    }
}

/// Collects callback invocations for awaiting in tests
pub fn recorder<T: Send + 'static>() -> (
    impl Fn(T) + Send + Sync + Clone + 'static,
    mpsc::UnboundedReceiver<T>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (move |value| {
        let _ = tx.send(value);
    }, rx)
}

pub async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Wait for the region revision to move past its current value
pub async fn changed(rx: &mut watch::Receiver<u64>) {
    tokio::time::timeout(WAIT, rx.changed())
        .await
        .expect("timed out waiting for region rebuild")
        .expect("region dropped");
}
