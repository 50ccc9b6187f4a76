//! Human-readable trace blocks for requests and responses.
//!
//! # Design
//! Rendering is pure: every function takes borrowed values and returns a new
//! `String`, so the same request always renders byte-identically. Each block
//! ends with a closing delimiter and a blank separator line so consecutive
//! blocks read cleanly in a shared log.

use crate::curl::curl_command;
use crate::http::{HttpRequest, HttpResponse};

const REQUEST_OPEN: &str = "=== HTTP REQUEST ===";
const REQUEST_CLOSE: &str = "====================";
const RESPONSE_OPEN: &str = "=== HTTP RESPONSE ===";
const RESPONSE_CLOSE: &str = "=====================";

/// Render the trace block for a request about to be sent to `resolved_url`.
pub fn render_request(request: &HttpRequest, resolved_url: &str) -> String {
    let mut lines = vec![
        REQUEST_OPEN.to_string(),
        format!("URL: {} {}", request.method, resolved_url),
    ];

    if !request.headers.is_empty() {
        lines.push("Headers:".to_string());
        lines.extend(
            request
                .headers
                .iter()
                .map(|(name, value)| format!("{name}: {value}")),
        );
    }

    if let Some(body) = request.body.as_deref() {
        lines.push("Body:".to_string());
        lines.push(normalize_indentation(body));
    }

    lines.push("CURL:".to_string());
    lines.push(curl_command(request, resolved_url));
    lines.push(REQUEST_CLOSE.to_string());
    finish(lines)
}

/// Render the trace block for a response received from a transport.
pub fn render_response(response: &HttpResponse) -> String {
    let mut lines = vec![
        RESPONSE_OPEN.to_string(),
        format!("Status: {} {}", response.status, response.status_text()),
    ];

    if let Some(elapsed) = response.elapsed {
        lines.push(format!("Time: {} ms", elapsed.as_millis()));
    }

    if !response.body.is_empty() {
        lines.push("Body:".to_string());
        lines.push(normalize_indentation(&response.body));
    }

    if let Some(error) = response.error.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("Error: {error}"));
    }

    lines.push(RESPONSE_CLOSE.to_string());
    finish(lines)
}

/// Strip the indentation shared by every non-blank line.
///
/// The minimum leading-whitespace width is measured over non-blank lines only
/// (zero if there are none) and then removed from every line long enough to
/// have it, blank lines included. Shorter lines are left as they are.
pub fn normalize_indentation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| strip_chars(line, indent))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_chars(line: &str, count: usize) -> &str {
    if line.chars().count() < count {
        return line;
    }
    line.char_indices()
        .nth(count)
        .map_or("", |(offset, _)| &line[offset..])
}

// Closing delimiter is the last entry; the trailing empty entry yields the
// blank separator line.
fn finish(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    let mut block = lines.join("\n");
    block.push('\n');
    block
}
