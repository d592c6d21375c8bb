//! LspLanguageService implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};

use super::converters::{convert_diagnostics, parse_document_symbols};
use super::{LanguageService, MarkerListener};
use crate::editor::{ListenerSet, Subscription};
use crate::environment::DiagnosticsOptions;
use crate::error::LspError;
use crate::infra::lsp::init_options::yaml_settings;
use crate::infra::lsp::protocol::PublishDiagnosticsParams;
use crate::infra::lsp::{LspClient, ServerConfig};
use crate::models::{DocumentUri, Marker, Symbol};

type MarkerCache = Arc<RwLock<HashMap<DocumentUri, Vec<Marker>>>>;

enum Command {
    Configure(DiagnosticsOptions),
    Open {
        uri: DocumentUri,
        language_id: String,
        text: String,
    },
    Update {
        uri: DocumentUri,
        text: String,
    },
    Close {
        uri: DocumentUri,
    },
    Symbols {
        uri: DocumentUri,
        reply: oneshot::Sender<Result<Vec<Symbol>, LspError>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// [`LanguageService`] backed by a yaml-language-server process.
///
/// Calls are queued and replayed to the server by one worker task, so the
/// server sees configuration, sync and outline requests in issue order.
pub struct LspLanguageService {
    commands: mpsc::UnboundedSender<Command>,
    client: Arc<LspClient>,
    markers: MarkerCache,
    listeners: Arc<ListenerSet<[DocumentUri]>>,
}

impl LspLanguageService {
    /// Spawn the server and connect to it
    pub async fn start(server: &ServerConfig) -> Result<Arc<Self>, LspError> {
        let client = LspClient::new();
        let service = Self::with_client(Arc::clone(&client)).await;
        client.start(server).await?;
        Ok(service)
    }

    /// Drive an already connected client
    pub async fn with_client(client: Arc<LspClient>) -> Arc<Self> {
        let markers: MarkerCache = Arc::new(RwLock::new(HashMap::new()));
        let listeners: Arc<ListenerSet<[DocumentUri]>> = Arc::new(ListenerSet::new());

        let cache = Arc::clone(&markers);
        let notify = Arc::clone(&listeners);
        client
            .on_notification("textDocument/publishDiagnostics", move |params| {
                match serde_json::from_value::<PublishDiagnosticsParams>(params) {
                    Ok(params) => {
                        let uri = DocumentUri::new(params.uri);
                        let batch = convert_diagnostics(&uri, params.diagnostics);
                        tracing::debug!("{} markers for {}", batch.len(), uri);
                        store_batch(&cache, &uri, batch);
                        notify.emit(std::slice::from_ref(&uri));
                    }
                    Err(e) => tracing::warn!("Malformed publishDiagnostics: {}", e),
                }
            })
            .await;

        let (commands, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(Arc::clone(&client), Arc::clone(&markers), queue));

        Arc::new(Self {
            commands,
            client,
            markers,
            listeners,
        })
    }

    pub fn client(&self) -> &Arc<LspClient> {
        &self.client
    }

    /// Flush queued commands, then stop the server
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self.commands.send(Command::Shutdown { done }).is_ok() {
            let _ = finished.await;
        }
    }

    fn enqueue(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Language service stopped; dropping command");
        }
    }
}

/// An empty batch drops the entry, so closed documents leave nothing behind
fn store_batch(cache: &MarkerCache, uri: &DocumentUri, batch: Vec<Marker>) {
    let mut cache = cache.write();
    if batch.is_empty() {
        cache.remove(uri);
    } else {
        cache.insert(uri.clone(), batch);
    }
}

async fn run_worker(
    client: Arc<LspClient>,
    markers: MarkerCache,
    mut queue: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(command) = queue.recv().await {
        let result = match command {
            Command::Configure(options) => client.configure(yaml_settings(&options)).await,
            Command::Open {
                uri,
                language_id,
                text,
            } => client.open_document(uri.as_str(), &language_id, &text).await,
            Command::Update { uri, text } => client.change_document(uri.as_str(), &text).await,
            Command::Close { uri } => {
                markers.write().remove(&uri);
                client.close_document(uri.as_str()).await
            }
            Command::Symbols { uri, reply } => {
                // Earlier writes are already on the wire; answer off-queue
                let client = Arc::clone(&client);
                tokio::spawn(async move {
                    let symbols = client
                        .document_symbols(uri.as_str())
                        .await
                        .and_then(parse_document_symbols);
                    let _ = reply.send(symbols);
                });
                Ok(())
            }
            Command::Shutdown { done } => {
                if let Err(e) = client.shutdown().await {
                    tracing::warn!("Language server shutdown failed: {}", e);
                }
                let _ = done.send(());
                break;
            }
        };

        match result {
            Err(e) if e.needs_restart() => tracing::error!("Language server unavailable: {}", e),
            Err(e) => tracing::warn!("Language server command failed: {}", e),
            Ok(()) => {}
        }
    }
    tracing::debug!("Language service worker stopped");
}

#[async_trait]
impl LanguageService for LspLanguageService {
    fn configure(&self, options: &DiagnosticsOptions) {
        self.enqueue(Command::Configure(options.clone()));
    }

    fn open_document(&self, uri: &DocumentUri, language_id: &str, text: &str) {
        self.enqueue(Command::Open {
            uri: uri.clone(),
            language_id: language_id.to_string(),
            text: text.to_string(),
        });
    }

    fn update_document(&self, uri: &DocumentUri, text: &str) {
        self.enqueue(Command::Update {
            uri: uri.clone(),
            text: text.to_string(),
        });
    }

    fn close_document(&self, uri: &DocumentUri) {
        self.enqueue(Command::Close { uri: uri.clone() });
    }

    async fn document_symbols(&self, uri: &DocumentUri) -> Result<Vec<Symbol>, LspError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Symbols {
                uri: uri.clone(),
                reply,
            })
            .map_err(|_| LspError::ServiceStopped)?;
        response.await.map_err(|_| LspError::ServiceStopped)?
    }

    fn markers(&self, uri: &DocumentUri) -> Vec<Marker> {
        self.markers.read().get(uri).cloned().unwrap_or_default()
    }

    fn on_did_change_markers(&self, listener: MarkerListener) -> Subscription {
        self.listeners.add(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::lsp::protocol::{Message, Notification, Response};
    use crate::infra::lsp::transport::{Transport, write_message};
    use crate::models::MarkerSeverity;
    use serde_json::json;

    async fn service_with_pipe() -> (
        Arc<LspLanguageService>,
        Transport<tokio::io::ReadHalf<tokio::io::DuplexStream>>,
        tokio::io::WriteHalf<tokio::io::DuplexStream>,
    ) {
        let (client_end, server_end) = tokio::io::duplex(64 * 1024);
        let (client_read, client_write) = tokio::io::split(client_end);
        let (server_read, server_write) = tokio::io::split(server_end);

        let client = LspClient::new();
        client.connect(client_read, client_write).await;
        let service = LspLanguageService::with_client(client).await;
        (service, Transport::new(server_read), server_write)
    }

    #[tokio::test]
    async fn test_commands_reach_server_in_order() {
        let (service, mut server, _writer) = service_with_pipe().await;
        let uri = DocumentUri::new("file:///one.yaml");

        service.open_document(&uri, "yaml", "a: 1");
        service.update_document(&uri, "a: 2");
        service.close_document(&uri);

        let mut methods = Vec::new();
        for _ in 0..3 {
            if let Message::Notification(n) = server.read_message().await.unwrap() {
                methods.push(n.method);
            }
        }
        assert_eq!(
            methods,
            vec![
                "textDocument/didOpen",
                "textDocument/didChange",
                "textDocument/didClose"
            ]
        );
    }

    #[tokio::test]
    async fn test_published_diagnostics_become_markers() {
        let (service, _server, mut writer) = service_with_pipe().await;
        let uri = DocumentUri::new("file:///one.yaml");

        let (tx, rx) = oneshot::channel::<Vec<DocumentUri>>();
        let tx = parking_lot::Mutex::new(Some(tx));
        let _sub = service.on_did_change_markers(Arc::new(move |uris| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(uris.to_vec());
            }
        }));

        let params = json!({
            "uri": "file:///one.yaml",
            "diagnostics": [{
                "range": {"start": {"line": 0, "character": 5}, "end": {"line": 0, "character": 8}},
                "severity": 1,
                "message": "Incorrect type. Expected \"number\"."
            }]
        });
        write_message(
            &mut writer,
            &Notification::new("textDocument/publishDiagnostics", Some(params)),
        )
        .await
        .unwrap();

        assert_eq!(rx.await.unwrap(), vec![uri.clone()]);
        let markers = service.markers(&uri);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].severity, MarkerSeverity::Error);
        assert!(service.markers(&DocumentUri::new("file:///other.yaml")).is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_after_close_leaves_no_entry() {
        let (service, _server, mut writer) = service_with_pipe().await;
        let uri = DocumentUri::new("file:///closed.yaml");

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let _sub = service.on_did_change_markers(Arc::new(move |_| {
            let _ = tx.send(());
        }));

        let publish = |diagnostics: serde_json::Value| {
            Notification::new(
                "textDocument/publishDiagnostics",
                Some(json!({ "uri": "file:///closed.yaml", "diagnostics": diagnostics })),
            )
        };
        let warning = json!([{
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 1}},
            "severity": 2,
            "message": "Property x is not allowed."
        }]);

        write_message(&mut writer, &publish(warning)).await.unwrap();
        rx.recv().await.unwrap();
        assert_eq!(service.markers(&uri).len(), 1);

        // yaml-language-server clears diagnostics after didClose
        service.close_document(&uri);
        write_message(&mut writer, &publish(json!([]))).await.unwrap();
        rx.recv().await.unwrap();

        assert!(service.markers(&uri).is_empty());
        assert!(service.markers.read().is_empty());
    }

    #[tokio::test]
    async fn test_document_symbols_round_trip() {
        let (service, mut server, mut writer) = service_with_pipe().await;
        let uri = DocumentUri::new("file:///one.yaml");

        let pending = tokio::spawn({
            let service = Arc::clone(&service);
            let uri = uri.clone();
            async move { service.document_symbols(&uri).await }
        });

        let request = match server.read_message().await.unwrap() {
            Message::Request(r) => r,
            other => panic!("expected request, got {:?}", other),
        };
        assert_eq!(request.method, "textDocument/documentSymbol");

        let result = json!([{
            "name": "foo",
            "kind": 16,
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 6}},
            "selectionRange": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 3}}
        }]);
        write_message(&mut writer, &Response::ok(request.id, result))
            .await
            .unwrap();

        let symbols = pending.await.unwrap().unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "foo");
    }

    #[tokio::test]
    async fn test_configure_pushes_schema_settings() {
        let (service, mut server, mut writer) = service_with_pipe().await;

        // Finish the handshake so configuration is sent immediately
        let init = tokio::spawn({
            let client = Arc::clone(service.client());
            async move { client.initialize().await }
        });
        if let Message::Request(r) = server.read_message().await.unwrap() {
            write_message(&mut writer, &Response::ok(r.id, json!({"capabilities": {}})))
                .await
                .unwrap();
        }
        assert!(matches!(
            server.read_message().await.unwrap(),
            Message::Notification(_)
        ));
        init.await.unwrap().unwrap();

        let options = DiagnosticsOptions {
            schemas: vec![crate::environment::SchemaAssociation::new(
                "https://example.com/schema.json",
                "abc.yaml",
            )],
            ..Default::default()
        };
        service.configure(&options);

        match server.read_message().await.unwrap() {
            Message::Notification(n) => {
                assert_eq!(n.method, "workspace/didChangeConfiguration");
                let params = n.params.unwrap();
                assert_eq!(
                    params["settings"]["yaml"]["schemas"]["https://example.com/schema.json"],
                    json!(["abc.yaml"])
                );
            }
            other => panic!("expected notification, got {:?}", other),
        }
    }
}
