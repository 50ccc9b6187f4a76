//! Copy-pasteable `curl` equivalents of requests.
//!
//! Only double quotes inside the body are escaped. The result is a reading
//! aid for traces, not a shell-safe command.

use crate::http::{HttpMethod, HttpRequest};
use crate::trace::normalize_indentation;

/// Build the `curl` invocation that would send `request` to `resolved_url`.
pub fn curl_command(request: &HttpRequest, resolved_url: &str) -> String {
    let mut tokens = vec!["curl".to_string()];

    if request.method != HttpMethod::Get {
        tokens.push(format!("-X {}", request.method));
    }

    tokens.extend(
        request
            .headers
            .iter()
            .map(|(name, value)| format!("-H \"{name}: {value}\"")),
    );

    if let Some(body) = request.body.as_deref() {
        let escaped = normalize_indentation(body).replace('"', "\\\"");
        tokens.push(format!("-d \"{escaped}\""));
    }

    tokens.push(format!("\"{resolved_url}\""));
    tokens.join(" ")
}
