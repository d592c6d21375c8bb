use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::time::timeout;

use super::init_options::configuration_for;
use super::protocol::{
    ClientCapabilities, ClientInfo, ConfigurationParams, GeneralClientCapabilities,
    InitializeParams, InitializeResult, LogMessageParams, Message, MessageType, Notification,
    Request, RequestId, Response, ResponseError, StaleRequestSupport,
    TextDocumentClientCapabilities, WindowClientCapabilities, WorkspaceClientCapabilities,
    error_codes,
};
use super::servers::ServerConfig;
use super::transport::{Transport, write_message};
use crate::error::LspError;
use crate::infra::retry::{Backoff, with_backoff};

type PendingRequest = oneshot::Sender<Response>;
type NotificationHandler = Box<dyn Fn(Value) + Send + Sync>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Debug, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

#[derive(Debug)]
struct DocumentState {
    version: i32,
    content_hash: u64,
}

impl DocumentState {
    fn new(content: &str) -> Self {
        Self {
            version: 1,
            content_hash: crate::infra::hash_content(content),
        }
    }

    fn needs_update(&self, new_content: &str) -> bool {
        crate::infra::hash_content(new_content) != self.content_hash
    }

    fn update(&mut self, new_content: &str) {
        self.version += 1;
        self.content_hash = crate::infra::hash_content(new_content);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Initializing,
    ShuttingDown,
    NotRunning,
}

/// JSON-RPC client for one yaml-language-server process
pub struct LspClient {
    process: Mutex<Option<Child>>,
    writer: Mutex<Option<Writer>>,
    next_id: AtomicU64,
    pending: RwLock<HashMap<RequestId, PendingRequest>>,
    documents: Mutex<HashMap<String, DocumentState>>,
    notification_handlers: RwLock<HashMap<String, NotificationHandler>>,
    /// Current settings, answered to `workspace/configuration` pulls
    settings: parking_lot::RwLock<Value>,
    capabilities: RwLock<Option<InitializeResult>>,
    shutdown: AtomicBool,
    terminated: AtomicBool,
}

impl LspClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            process: Mutex::new(None),
            writer: Mutex::new(None),
            next_id: AtomicU64::new(1),
            pending: RwLock::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            notification_handlers: RwLock::new(HashMap::new()),
            settings: parking_lot::RwLock::new(Value::Null),
            capabilities: RwLock::new(None),
            shutdown: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        })
    }

    /// Spawn the server process and run the initialize handshake
    pub async fn start(self: &Arc<Self>, server: &ServerConfig) -> Result<(), LspError> {
        if self.is_running().await {
            return Ok(());
        }

        tracing::info!("Starting {}: {} {:?}", server.name, server.command, server.args);

        let mut child = Command::new(&server.command)
            .args(&server.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LspError::ServerNotInstalled {
                        name: server.name.clone(),
                        install_hint: server.install_hint.clone(),
                    }
                } else {
                    LspError::ServerStart(format!("{}: {}", server.command, e))
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LspError::ServerStart("Failed to get stdout".to_string()))?;

        *self.process.lock().await = Some(child);
        self.connect(stdout, stdin).await;
        self.initialize().await?;

        tracing::info!("{} started", server.name);
        Ok(())
    }

    /// Attach to an already running server over the given streams.
    ///
    /// Starts the reader task. The caller runs [`LspClient::initialize`].
    pub async fn connect<R, W>(self: &Arc<Self>, reader: R, writer: W)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        *self.writer.lock().await = Some(Box::new(writer));
        self.terminated.store(false, Ordering::Release);

        let client = Arc::clone(self);
        tokio::spawn(async move {
            client.read_responses(Transport::new(reader)).await;
        });
    }

    pub async fn is_running(&self) -> bool {
        if self.terminated.load(Ordering::Acquire) || self.writer.lock().await.is_none() {
            return false;
        }
        let mut process = self.process.lock().await;
        match process.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            // Connected over plain streams
            None => true,
        }
    }

    pub async fn health_status(&self) -> HealthStatus {
        if self.shutdown.load(Ordering::Acquire) {
            return HealthStatus::ShuttingDown;
        }
        if !self.is_running().await {
            return HealthStatus::NotRunning;
        }
        if self.capabilities.read().await.is_some() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Initializing
        }
    }

    pub async fn initialize(&self) -> Result<(), LspError> {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            root_uri: None,
            capabilities: Self::client_capabilities(),
            client_info: Some(ClientInfo {
                name: "yamlpane".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            initialization_options: None,
        };

        let result: InitializeResult = self
            .request("initialize", Some(serde_json::to_value(params)?))
            .await?;

        if let Some(info) = &result.server_info {
            tracing::debug!("Connected to {} {:?}", info.name, info.version);
        }
        *self.capabilities.write().await = Some(result);

        self.notify("initialized", Some(serde_json::json!({})))
            .await?;

        // Settings pushed before the handshake finished are replayed now
        let settings = self.settings.read().clone();
        if !settings.is_null() {
            self.push_settings(settings).await?;
        }
        Ok(())
    }

    fn client_capabilities() -> ClientCapabilities {
        let general = GeneralClientCapabilities {
            position_encodings: Some(vec!["utf-16".to_string()]),
            stale_request_support: Some(StaleRequestSupport {
                cancel: true,
                retry_on_content_modified: Some(vec!["textDocument/documentSymbol".to_string()]),
            }),
        };

        let text_document = TextDocumentClientCapabilities {
            synchronization: Some(serde_json::json!({
                "dynamicRegistration": false,
                "didSave": false
            })),
            completion: Some(serde_json::json!({
                "completionItem": {
                    "snippetSupport": true,
                    "documentationFormat": ["markdown", "plaintext"]
                }
            })),
            hover: Some(serde_json::json!({
                "contentFormat": ["markdown", "plaintext"]
            })),
            document_symbol: Some(serde_json::json!({
                "symbolKind": {
                    "valueSet": (1..=26).collect::<Vec<_>>()
                },
                "hierarchicalDocumentSymbolSupport": true
            })),
            formatting: Some(serde_json::json!({
                "dynamicRegistration": false
            })),
            publish_diagnostics: Some(serde_json::json!({
                "relatedInformation": false,
                "versionSupport": true
            })),
        };

        let workspace = WorkspaceClientCapabilities {
            did_change_configuration: Some(serde_json::json!({
                "dynamicRegistration": false
            })),
            workspace_folders: Some(false),
            configuration: Some(true),
        };

        ClientCapabilities {
            general: Some(general),
            window: Some(WindowClientCapabilities {
                work_done_progress: Some(false),
            }),
            text_document: Some(text_document),
            workspace: Some(workspace),
        }
    }

    /// Send a request and wait for response
    pub async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, LspError> {
        if self.terminated.load(Ordering::Acquire) {
            return Err(LspError::ServerTerminated);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(RequestId::Number(id), tx);

        let request = Request::new(id, method, params);
        tracing::trace!("LSP request {}: {}", id, method);

        let written = {
            let mut writer = self.writer.lock().await;
            match writer.as_mut() {
                Some(writer) => write_message(writer, &request).await.map_err(LspError::from),
                None => Err(LspError::NotConnected),
            }
        };
        if let Err(e) = written {
            self.pending.write().await.remove(&RequestId::Number(id));
            return Err(e);
        }

        match timeout(crate::config::timeout_for(method), rx).await {
            Ok(Ok(response)) => match response.into_result() {
                Ok(result) => {
                    serde_json::from_value(result).map_err(|e| LspError::Protocol(e.to_string()))
                }
                Err(err) if err.code == error_codes::SERVER_TERMINATED => {
                    Err(LspError::ServerTerminated)
                }
                Err(err) if err.code == error_codes::REQUEST_CANCELLED => {
                    Err(LspError::RequestCancelled)
                }
                Err(err) => Err(err.into()),
            },
            Ok(Err(_)) => Err(LspError::RequestCancelled),
            Err(_) => {
                self.cancel_request(id).await;
                Err(LspError::Timeout(format!(
                    "'{}' timed out. The language server may be busy or unresponsive",
                    method
                )))
            }
        }
    }

    pub async fn request_with_backoff<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
        backoff: &Backoff,
    ) -> Result<T, LspError> {
        with_backoff(backoff, || self.request(method, params.clone())).await
    }

    pub async fn cancel_request(&self, id: u64) {
        self.pending.write().await.remove(&RequestId::Number(id));
        let _ = self
            .notify("$/cancelRequest", Some(serde_json::json!({ "id": id })))
            .await;
    }

    /// Send a notification (no response expected)
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), LspError> {
        let notification = Notification::new(method, params);

        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(LspError::NotConnected)?;
        write_message(writer, &notification).await?;

        Ok(())
    }

    /// Replace the server settings and announce them
    pub async fn configure(&self, settings: Value) -> Result<(), LspError> {
        *self.settings.write() = settings.clone();
        if self.capabilities.read().await.is_none() {
            // Sent after the handshake
            return Ok(());
        }
        self.push_settings(settings).await
    }

    async fn push_settings(&self, settings: Value) -> Result<(), LspError> {
        self.notify(
            "workspace/didChangeConfiguration",
            Some(serde_json::json!({ "settings": settings })),
        )
        .await
    }

    pub async fn open_document(
        &self,
        uri: &str,
        language_id: &str,
        content: &str,
    ) -> Result<(), LspError> {
        let mut documents = self.documents.lock().await;
        if documents.contains_key(uri) {
            drop(documents);
            return self.change_document(uri, content).await;
        }

        let state = DocumentState::new(content);
        self.notify(
            "textDocument/didOpen",
            Some(serde_json::json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": language_id,
                    "version": state.version,
                    "text": content
                }
            })),
        )
        .await?;
        documents.insert(uri.to_string(), state);
        Ok(())
    }

    /// Send the full new text. Skipped when the content hash is unchanged.
    pub async fn change_document(&self, uri: &str, content: &str) -> Result<(), LspError> {
        let mut documents = self.documents.lock().await;
        let Some(state) = documents.get_mut(uri) else {
            tracing::debug!("Ignoring change for unopened document {}", uri);
            return Ok(());
        };
        if !state.needs_update(content) {
            return Ok(());
        }

        state.update(content);
        let version = state.version;
        self.notify(
            "textDocument/didChange",
            Some(serde_json::json!({
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": content }]
            })),
        )
        .await
    }

    pub async fn close_document(&self, uri: &str) -> Result<(), LspError> {
        if self.documents.lock().await.remove(uri).is_none() {
            return Ok(());
        }
        self.notify(
            "textDocument/didClose",
            Some(serde_json::json!({ "textDocument": { "uri": uri } })),
        )
        .await
    }

    pub async fn is_open(&self, uri: &str) -> bool {
        self.documents.lock().await.contains_key(uri)
    }

    /// Raw `textDocument/documentSymbol` result
    pub async fn document_symbols(&self, uri: &str) -> Result<Value, LspError> {
        self.request_with_backoff(
            "textDocument/documentSymbol",
            Some(serde_json::json!({ "textDocument": { "uri": uri } })),
            &Backoff::OUTLINE,
        )
        .await
    }

    /// Register a notification handler for a specific method
    pub async fn on_notification<F>(&self, method: &str, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.notification_handlers
            .write()
            .await
            .insert(method.to_string(), Box::new(handler));
    }

    /// Background task that reads and dispatches responses
    async fn read_responses<R: AsyncRead + Unpin>(self: Arc<Self>, mut transport: Transport<R>) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match transport.read_message().await {
                Ok(message) => {
                    self.handle_message(message).await;
                }
                Err(e) => {
                    if !self.shutdown.load(Ordering::Acquire) {
                        tracing::error!("LSP read error: {}", e);
                        self.cancel_pending_requests(
                            error_codes::SERVER_TERMINATED,
                            "yaml-language-server terminated unexpectedly",
                        )
                        .await;
                        self.terminated.store(true, Ordering::Release);
                    }
                    break;
                }
            }
        }
    }

    async fn cancel_pending_requests(&self, code: i32, reason: &str) {
        let mut pending = self.pending.write().await;
        if !pending.is_empty() {
            tracing::debug!("Cancelling {} pending requests: {}", pending.len(), reason);
        }
        for (id, sender) in pending.drain() {
            let _ = sender.send(Response::error(id, code, reason));
        }
    }

    async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let Some(id) = response.id.clone() else {
                    return;
                };
                let mut pending = self.pending.write().await;
                // Some servers echo numeric ids back as strings
                let sender = pending.remove(&id).or_else(|| match &id {
                    RequestId::String(s) => s
                        .parse::<u64>()
                        .ok()
                        .and_then(|n| pending.remove(&RequestId::Number(n))),
                    RequestId::Number(_) => None,
                });
                match sender {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => {
                        tracing::debug!(
                            "Received response for unknown request ID {:?} (may have timed out)",
                            id
                        );
                    }
                }
            }
            Message::Request(request) => {
                self.handle_server_request(request).await;
            }
            Message::Notification(notification) => {
                let method = notification.method.as_str();
                let params = notification.params.unwrap_or(Value::Null);

                {
                    let handlers = self.notification_handlers.read().await;
                    if let Some(handler) = handlers.get(method) {
                        handler(params.clone());
                        return;
                    }
                }

                match method {
                    "window/logMessage" | "window/showMessage" => {
                        if let Ok(log) = serde_json::from_value::<LogMessageParams>(params) {
                            Self::log_server_message(&log);
                        }
                    }
                    _ => {
                        tracing::trace!("Unhandled notification: {}", method);
                    }
                }
            }
        }
    }

    fn log_server_message(log: &LogMessageParams) {
        let msg = log.message.as_str();
        match Self::classify_log_level(log.kind) {
            LogLevel::Error => tracing::error!("yaml-language-server: {}", msg),
            LogLevel::Warn => tracing::warn!("yaml-language-server: {}", msg),
            LogLevel::Info => tracing::info!("yaml-language-server: {}", msg),
            LogLevel::Debug => tracing::debug!("yaml-language-server: {}", msg),
        }
    }

    fn classify_log_level(kind: MessageType) -> LogLevel {
        match kind {
            MessageType::Error => LogLevel::Error,
            MessageType::Warning => LogLevel::Warn,
            MessageType::Info => LogLevel::Info,
            MessageType::Log | MessageType::Debug => LogLevel::Debug,
        }
    }

    async fn handle_server_request(&self, request: Request) {
        let result = match request.method.as_str() {
            "workspace/configuration" => Ok(self.handle_workspace_configuration(&request.params)),
            "client/registerCapability"
            | "client/unregisterCapability"
            | "window/workDoneProgress/create" => Ok(Value::Null),
            _ => {
                tracing::debug!("Unhandled server request: {}", request.method);
                Err(ResponseError {
                    code: error_codes::METHOD_NOT_FOUND,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                })
            }
        };

        let response = match result {
            Ok(value) => Response::ok(request.id, value),
            Err(error) => Response::error(request.id, error.code, error.message),
        };

        let mut writer = self.writer.lock().await;
        if let Some(writer) = writer.as_mut()
            && let Err(e) = write_message(writer, &response).await
        {
            tracing::warn!("Failed to answer {}: {}", request.method, e);
        }
    }

    fn handle_workspace_configuration(&self, params: &Option<Value>) -> Value {
        let items = params
            .clone()
            .and_then(|p| serde_json::from_value::<ConfigurationParams>(p).ok())
            .map(|p| p.items)
            .unwrap_or_default();

        let settings = self.settings.read();
        Value::Array(
            items
                .iter()
                .map(|item| configuration_for(&settings, item.section.as_deref()))
                .collect(),
        )
    }

    pub async fn capabilities(&self) -> Option<InitializeResult> {
        self.capabilities.read().await.clone()
    }

    /// Shutdown the language server with 3-stage graceful termination
    pub async fn shutdown(&self) -> Result<(), LspError> {
        // Stage 1: Send LSP shutdown request (2s timeout)
        let shutdown_result = timeout(Duration::from_secs(2), async {
            if let Ok(()) = self.request::<()>("shutdown", None).await {
                let _ = self.notify("exit", None).await;
            }
        })
        .await;

        if shutdown_result.is_err() {
            tracing::debug!("LSP shutdown request timed out");
        }
        self.shutdown.store(true, Ordering::Release);

        // Closing the pipe signals EOF
        self.writer.lock().await.take();

        // Stage 2 & 3: Wait for process exit, then force kill
        if let Some(mut child) = self.process.lock().await.take() {
            match timeout(Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => {
                    tracing::debug!("yaml-language-server exited: {:?}", status);
                }
                Ok(Err(e)) => {
                    tracing::warn!("yaml-language-server wait error: {}", e);
                }
                Err(_) => {
                    tracing::warn!("yaml-language-server termination timed out, forcing kill");
                    let _ = child.kill().await;
                }
            }
        }

        self.cancel_pending_requests(error_codes::REQUEST_CANCELLED, "Server shutdown")
            .await;
        self.documents.lock().await.clear();
        tracing::info!("yaml-language-server stopped");
        Ok(())
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        if let Ok(mut process_guard) = self.process.try_lock() {
            if let Some(ref mut child) = *process_guard {
                let _ = child.start_kill();
                tracing::debug!("LspClient dropped, process killed");
            }
        } else {
            tracing::warn!("LspClient dropped but could not acquire lock - potential zombie process");
        }
    }
}
