//! DTOs for the posts/users API.
//!
//! Field names follow the service's camelCase JSON. These types are defined
//! independently of the mock server; the scenario tests catch schema drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sign-in payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub id_user: i64,
    pub text: String,
}

/// A single JSON-Patch operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: serde_json::Value,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.into(),
            value: value.into(),
        }
    }
}

/// A user as returned by `GET /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub edit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}
