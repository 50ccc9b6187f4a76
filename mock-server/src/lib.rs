//! Stand-in for the posts/users API.
//!
//! Routes mirror the remote service: sign-in issues a session id, and every
//! other endpoint requires it in a `Session` header. Posts live in the
//! document store, users in the relational store; see [`store`].

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod config;
pub mod error;
pub mod store;

pub use config::ServerConfig;
pub use error::ApiFailure;
pub use store::{AppState, PostDocument, PostStore, SessionStore, UserColumn, UserRow, UserStore};

pub const SESSION_HEADER: &str = "Session";

#[derive(Deserialize)]
pub struct SignIn {
    pub login: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub id_user: i64,
    pub text: String,
}

#[derive(Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: serde_json::Value,
}

/// Router over a freshly seeded default state.
pub fn app() -> Router {
    app_with_state(AppState::seeded(&ServerConfig::default()))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/users/sign-in", post(sign_in))
        .route("/users/{id}", get(get_user).patch(update_user))
        .route("/posts", post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .with_state(state)
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let token = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().trim_matches('"'));
    match token {
        Some(token) if state.sessions.is_valid(token).await => Ok(()),
        _ => {
            tracing::warn!("rejected request without a valid session");
            Err(ApiFailure::Unauthorized)
        }
    }
}

async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<SignIn>,
) -> Result<Json<String>, ApiFailure> {
    if !state.credentials_match(&input.login, &input.password) {
        tracing::warn!(login = %input.login, "sign-in rejected");
        return Err(ApiFailure::BadCredentials);
    }
    let session = state.sessions.issue().await;
    tracing::info!(login = %input.login, "session issued");
    Ok(Json(session))
}

async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<String>), ApiFailure> {
    authorize(&state, &headers).await?;
    if !state.users.exists(input.id_user).await {
        return Err(ApiFailure::BadRequest(format!(
            "unknown user {}",
            input.id_user
        )));
    }
    let doc = PostDocument::new(input.id_user, input.text);
    let id = doc.id;
    state.posts.insert(doc).await;
    tracing::info!(%id, id_user = input.id_user, "post created");
    Ok((StatusCode::CREATED, Json(id.to_string())))
}

async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    authorize(&state, &headers).await?;
    state
        .posts
        .remove(id)
        .await
        .ok_or(ApiFailure::NotFound("post"))?;
    tracing::info!(%id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<UserRow>, ApiFailure> {
    authorize(&state, &headers).await?;
    state
        .users
        .select(id)
        .await
        .map(Json)
        .ok_or(ApiFailure::NotFound("user"))
}

async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(operations): Json<Vec<PatchOperation>>,
) -> Result<StatusCode, ApiFailure> {
    authorize(&state, &headers).await?;
    let changes = operations
        .iter()
        .map(column_change)
        .collect::<Result<Vec<_>, _>>()?;
    if !state.users.update(id, changes).await {
        return Err(ApiFailure::NotFound("user"));
    }
    tracing::info!(id, operations = operations.len(), "user updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Validate one patch operation; the whole patch is rejected on the first
/// invalid entry so a row is never half-updated.
fn column_change(op: &PatchOperation) -> Result<(UserColumn, String), ApiFailure> {
    if op.op != "replace" {
        return Err(ApiFailure::BadRequest(format!(
            "unsupported patch op {:?}",
            op.op
        )));
    }
    let column = UserColumn::from_patch_path(&op.path)
        .ok_or_else(|| ApiFailure::BadRequest(format!("unknown path {:?}", op.path)))?;
    let value = op
        .value
        .as_str()
        .ok_or_else(|| ApiFailure::BadRequest(format!("{} must be a string", op.path)))?;
    Ok((column, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(op: &str, path: &str, value: serde_json::Value) -> PatchOperation {
        PatchOperation {
            op: op.to_string(),
            path: path.to_string(),
            value,
        }
    }

    #[test]
    fn replace_on_known_column_is_accepted() {
        let change = column_change(&op("replace", "/lastname", "Smith".into())).unwrap();
        assert_eq!(change, (UserColumn::Lastname, "Smith".to_string()));
    }

    #[test]
    fn other_ops_are_rejected() {
        let err = column_change(&op("remove", "/lastname", serde_json::Value::Null)).unwrap_err();
        assert!(matches!(err, ApiFailure::BadRequest(_)));
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = column_change(&op("replace", "/city", serde_json::json!(5))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn create_post_payload_uses_camel_case() {
        let input: CreatePost = serde_json::from_str(r#"{"idUser":2,"text":"hi"}"#).unwrap();
        assert_eq!(input.id_user, 2);
        assert_eq!(input.text, "hi");
    }

    #[test]
    fn create_post_rejects_missing_text() {
        let result: Result<CreatePost, _> = serde_json::from_str(r#"{"idUser":2}"#);
        assert!(result.is_err());
    }
}
