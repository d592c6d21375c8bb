//! LSP infrastructure for yaml-language-server
//!
//! - JSON-RPC 2.0 protocol types
//! - Content-Length framed transport over any async stream
//! - Client with atomic request ids, document sync and server callbacks
//! - `yaml` settings built from the diagnostics options

pub mod client;
pub mod init_options;
pub mod protocol;
pub mod servers;
pub mod transport;

pub use client::{HealthStatus, LspClient};
pub use servers::{ServerConfig, ServerHealth};
