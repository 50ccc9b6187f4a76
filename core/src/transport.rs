//! Transport seam: the collaborator that actually performs HTTP round-trips.
//!
//! # Design
//! `Transport` is the only I/O boundary in the crate. Implementations resolve
//! a request's target into a fully-qualified URL and execute it, always
//! returning an `HttpResponse`: non-2xx statuses are data, and connection
//! failures are reported through `HttpResponse::transport_failure`.
//!
//! `UreqTransport` is the production implementation. Tests may substitute any
//! other implementation, including the diagnostic `LoggingClient`, which is a
//! `Transport` itself.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ureq::typestate::{WithBody, WithoutBody};
use ureq::RequestBuilder;
use url::{form_urlencoded, Url};

use crate::config::Settings;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Largest response body read into memory.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Executes `HttpRequest` values.
pub trait Transport: Send + Sync {
    /// Fully-qualified URL the request will be sent to, query included.
    fn resolve_url(&self, request: &HttpRequest) -> String;

    /// Perform the round-trip. Never fails: faults are encoded in the response.
    fn execute(&self, request: &HttpRequest) -> HttpResponse;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn resolve_url(&self, request: &HttpRequest) -> String {
        (**self).resolve_url(request)
    }

    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn resolve_url(&self, request: &HttpRequest) -> String {
        (**self).resolve_url(request)
    }

    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn resolve_url(&self, request: &HttpRequest) -> String {
        (**self).resolve_url(request)
    }

    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are never turned into errors, so 4xx/5xx responses reach the
/// caller as data.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: Option<String>,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            base_url: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.timeout()).with_base_url(&settings.base_url)
    }

    /// Relative request targets are joined onto `base_url`.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    fn send(
        &self,
        url: &str,
        request: &HttpRequest,
    ) -> Result<http::Response<ureq::Body>, ureq::Error> {
        match request.method {
            HttpMethod::Get => send_without_body(self.agent.get(url), request),
            HttpMethod::Delete => send_without_body(self.agent.delete(url), request),
            HttpMethod::Head => send_without_body(self.agent.head(url), request),
            HttpMethod::Options => send_without_body(self.agent.options(url), request),
            HttpMethod::Post => send_with_body(self.agent.post(url), request),
            HttpMethod::Put => send_with_body(self.agent.put(url), request),
            HttpMethod::Patch => send_with_body(self.agent.patch(url), request),
        }
    }
}

/// Convert a received response into data. The status line has already
/// arrived, so a failed body read is reported in `error` next to the real
/// status instead of as a transport failure.
fn into_response(url: &str, mut response: http::Response<ureq::Body>) -> HttpResponse {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let (body, error) = match response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
    {
        Ok(bytes) => (String::from_utf8_lossy(&bytes).into_owned(), None),
        Err(err) => {
            tracing::warn!(url = %url, status, error = %err, "failed to read response body");
            (String::new(), Some(err.to_string()))
        }
    };

    HttpResponse {
        status,
        headers,
        body,
        error,
        url: url.to_string(),
        elapsed: None,
    }
}

impl Transport for UreqTransport {
    fn resolve_url(&self, request: &HttpRequest) -> String {
        let target = match &self.base_url {
            Some(base) if Url::parse(&request.url).is_err() => {
                format!("{base}/{}", request.url.trim_start_matches('/'))
            }
            _ => request.url.clone(),
        };

        match Url::parse(&target) {
            Ok(mut url) => {
                if !request.query.is_empty() {
                    url.query_pairs_mut().extend_pairs(request.query.iter());
                }
                url.to_string()
            }
            Err(_) if request.query.is_empty() => target,
            Err(_) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(request.query.iter())
                    .finish();
                let separator = if target.contains('?') { '&' } else { '?' };
                format!("{target}{separator}{query}")
            }
        }
    }

    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        let url = self.resolve_url(request);
        let started = Instant::now();
        let outcome = self.send(&url, request);

        match outcome {
            Ok(response) => {
                let mut response = into_response(&url, response);
                response.elapsed = Some(started.elapsed());
                response
            }
            Err(err) => {
                tracing::warn!(method = %request.method, url = %url, error = %err, "transport failure");
                HttpResponse::transport_failure(url, err.to_string(), Some(started.elapsed()))
            }
        }
    }
}

fn apply_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = apply_headers(builder, request);
    match request.body.as_deref() {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<http::Response<ureq::Body>, ureq::Error> {
    let builder = apply_headers(builder, request);
    match request.body.as_deref() {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
