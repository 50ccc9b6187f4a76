//! Diagnostic decorator around a `Transport`.
//!
//! # Design
//! `LoggingClient` borrows its transport and sink; it never owns or closes
//! either. Each call renders the request trace, delegates, renders the
//! response trace, and hands back exactly what the transport returned. Both
//! traces are built into a `String` before being written, one sink call per
//! block.

use crate::http::{HttpRequest, HttpResponse};
use crate::sink::{LogSink, TracingSink};
use crate::trace::{render_request, render_response};
use crate::transport::Transport;

/// Logs every request and response passing through a wrapped transport.
pub struct LoggingClient<'a, T: ?Sized, S: ?Sized> {
    transport: &'a T,
    sink: &'a S,
}

impl<'a, T, S> LoggingClient<'a, T, S>
where
    T: Transport + ?Sized,
    S: LogSink + ?Sized,
{
    pub fn new(transport: &'a T, sink: &'a S) -> Self {
        Self { transport, sink }
    }

    /// Send `request` through the wrapped transport, tracing both directions.
    pub fn execute(&self, request: &HttpRequest) -> HttpResponse {
        let resolved_url = self.transport.resolve_url(request);
        self.sink.write_block(&render_request(request, &resolved_url));

        let response = self.transport.execute(request);

        self.sink.write_block(&render_response(&response));
        response
    }
}

static TRACING_SINK: TracingSink = TracingSink;

impl<'a, T: Transport + ?Sized> LoggingClient<'a, T, TracingSink> {
    /// Client that emits its traces as `tracing` events.
    pub fn with_tracing(transport: &'a T) -> Self {
        Self::new(transport, &TRACING_SINK)
    }
}

impl<T: ?Sized, S: ?Sized> Clone for LoggingClient<'_, T, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, S: ?Sized> Copy for LoggingClient<'_, T, S> {}

impl<T, S> Transport for LoggingClient<'_, T, S>
where
    T: Transport + ?Sized,
    S: LogSink + ?Sized,
{
    fn resolve_url(&self, request: &HttpRequest) -> String {
        self.transport.resolve_url(request)
    }

    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        LoggingClient::execute(self, request)
    }
}
