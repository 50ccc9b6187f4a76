//! Stateless request builder and response parser for the posts/users API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no state between calls.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the round-trip in between through any `Transport`, usually
//! a `LoggingClient`.
//!
//! Authenticated calls carry the session id in a `Session` header. Request
//! bodies are pretty-printed JSON.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreatePost, Credentials, PatchOperation, User};

pub const SESSION_HEADER: &str = "Session";
pub const JSON: &str = "application/json";
pub const JSON_PATCH: &str = "application/json-patch+json";

/// Synchronous, stateless client for the posts/users API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_sign_in(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::post(format!("{}/users/sign-in", self.base_url))
            .with_header("Content-Type", JSON)
            .with_body(to_json(credentials)?))
    }

    pub fn build_create_post(
        &self,
        session: &str,
        input: &CreatePost,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::post(format!("{}/posts", self.base_url))
            .with_header(SESSION_HEADER, session)
            .with_header("Content-Type", JSON)
            .with_body(to_json(input)?))
    }

    pub fn build_delete_post(&self, session: &str, id: Uuid) -> HttpRequest {
        HttpRequest::delete(format!("{}/posts/{id}", self.base_url))
            .with_header(SESSION_HEADER, session)
    }

    pub fn build_update_user(
        &self,
        session: &str,
        user_id: i64,
        operations: &[PatchOperation],
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::patch(format!("{}/users/{user_id}", self.base_url))
            .with_header(SESSION_HEADER, session)
            .with_header("Content-Type", JSON_PATCH)
            .with_body(to_json(&operations)?))
    }

    pub fn build_get_user(&self, session: &str, user_id: i64) -> HttpRequest {
        HttpRequest::get(format!("{}/users/{user_id}", self.base_url))
            .with_header(SESSION_HEADER, session)
    }

    /// Returns the session id with surrounding JSON quotes removed.
    pub fn parse_sign_in(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let session = unquote(&response.body);
        if session.is_empty() {
            return Err(ApiError::DeserializationError(
                "empty session id".to_string(),
            ));
        }
        Ok(session.to_string())
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Uuid, ApiError> {
        check_status(&response, 201)?;
        Uuid::parse_str(unquote(&response.body))
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn unquote(body: &str) -> &str {
    body.trim().trim_matches('"')
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        0 => Err(ApiError::Transport(
            response
                .error
                .clone()
                .unwrap_or_else(|| "no response".to_string()),
        )),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000/")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn build_sign_in_produces_correct_request() {
        let req = client()
            .build_sign_in(&Credentials {
                login: "123".to_string(),
                password: "123123123".to_string(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/users/sign-in");
        assert_eq!(req.headers, vec![("Content-Type".to_string(), JSON.to_string())]);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"login": "123", "password": "123123123"}));
    }

    #[test]
    fn build_create_post_sends_session_first() {
        let req = client()
            .build_create_post(
                "sess",
                &CreatePost {
                    id_user: 2,
                    text: "hi".to_string(),
                },
            )
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/posts");
        assert_eq!(req.headers[0], ("Session".to_string(), "sess".to_string()));
        assert_eq!(req.header("content-type"), Some(JSON));
        // Pretty-printed so traces have indentation to normalize.
        assert!(req.body.as_deref().unwrap().contains("\n  \"idUser\": 2"));
    }

    #[test]
    fn build_update_user_uses_json_patch() {
        let ops = [
            PatchOperation::replace("/lastname", "Smith"),
            PatchOperation::replace("/firstname", "Alex"),
        ];
        let req = client().build_update_user("sess", 2, &ops).unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "http://localhost:3000/users/2");
        assert_eq!(req.header("Content-Type"), Some(JSON_PATCH));
        let body: Vec<PatchOperation> = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, ops);
    }

    #[test]
    fn build_delete_and_get_have_no_body() {
        let id = Uuid::nil();
        let req = client().build_delete_post("sess", id);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(
            req.url,
            "http://localhost:3000/posts/00000000-0000-0000-0000-000000000000"
        );
        assert!(req.body.is_none());

        let req = client().build_get_user("sess", 2);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/users/2");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_sign_in_trims_quotes() {
        let session = client().parse_sign_in(response(200, "\"abc-123\"")).unwrap();
        assert_eq!(session, "abc-123");
    }

    #[test]
    fn parse_sign_in_rejects_empty_body() {
        let err = client().parse_sign_in(response(200, "")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_create_post_returns_id() {
        let id = Uuid::new_v4();
        let parsed = client()
            .parse_create_post(response(201, &format!("\"{id}\"")))
            .unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_create_post_rejects_garbage_id() {
        let err = client().parse_create_post(response(201, "\"nope\"")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_get_user_decodes_model() {
        let user = client()
            .parse_get_user(response(200, r#"{"id":2,"firstname":"Alex","lastname":"Smith"}"#))
            .unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.firstname.as_deref(), Some("Alex"));
    }

    #[test]
    fn status_mapping() {
        let c = client();
        assert!(matches!(
            c.parse_delete_post(response(404, "")),
            Err(ApiError::NotFound)
        ));
        assert!(matches!(
            c.parse_update_user(response(401, "")),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            c.parse_update_user(response(400, "bad op")),
            Err(ApiError::HttpError { status: 400, ref body }) if body == "bad op"
        ));
        assert!(c.parse_delete_post(response(204, "")).is_ok());
    }

    #[test]
    fn transport_failure_maps_to_transport_error() {
        let resp = HttpResponse::transport_failure("http://x", "connection refused", None);
        let err = client().parse_get_user(resp).unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref m) if m == "connection refused"));
    }
}
