//! Diagnostic HTTP client core for the posts/users API.
//!
//! # Overview
//! Builds `HttpRequest` values, executes them through a pluggable
//! `Transport`, and parses `HttpResponse` values. `LoggingClient` decorates any
//! transport and writes a human-readable trace of every request and response,
//! including an equivalent `curl` command, to a `LogSink`.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only `base_url` and splits each
//!   operation into `build_*` and `parse_*`.
//! - `Transport` is the single I/O seam; `UreqTransport` is the real one.
//! - Rendering (`trace`, `curl`) is pure and deterministic.
//! - `LoggingClient` borrows transport and sink and returns transport outcomes
//!   untouched.

pub mod client;
pub mod config;
pub mod curl;
pub mod error;
pub mod http;
pub mod logging;
pub mod sink;
pub mod trace;
pub mod transport;
pub mod types;

pub use crate::client::ApiClient;
pub use crate::config::Settings;
pub use crate::curl::curl_command;
pub use crate::error::ApiError;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use crate::logging::LoggingClient;
pub use crate::sink::{LogSink, MemorySink, TracingSink, WriterSink};
pub use crate::trace::{normalize_indentation, render_request, render_response};
pub use crate::transport::{Transport, UreqTransport};
pub use crate::types::{CreatePost, Credentials, PatchOperation, User};
