//! In-memory backing stores.
//!
//! `PostStore` plays the document collection, `UserStore` the relational
//! `users` table. Both are cheap to clone and share one map behind a tokio
//! `RwLock`. The `*_blocking` methods let synchronous callers (scenario tests
//! running outside the runtime) seed and inspect state; they panic if called
//! from inside an async context.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ServerConfig;

/// A post as stored in the document collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    pub id: Uuid,
    pub id_user: i64,
    pub text: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl PostDocument {
    pub fn new(id_user: i64, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            id_user,
            text: text.into(),
            create_date: now,
            edit_date: now,
        }
    }
}

/// A row of the `users` table.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
    pub login: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub gender: Option<String>,
    pub city: Option<String>,
}

/// Columns of `users` that JSON-Patch `replace` may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserColumn {
    Login,
    Firstname,
    Lastname,
    Gender,
    City,
}

impl UserColumn {
    /// Map a patch path such as `/firstname` to its column.
    pub fn from_patch_path(path: &str) -> Option<Self> {
        match path.trim_start_matches('/').to_ascii_lowercase().as_str() {
            "login" => Some(UserColumn::Login),
            "firstname" => Some(UserColumn::Firstname),
            "lastname" => Some(UserColumn::Lastname),
            "gender" => Some(UserColumn::Gender),
            "city" => Some(UserColumn::City),
            _ => None,
        }
    }
}

impl UserRow {
    fn set(&mut self, column: UserColumn, value: String) {
        match column {
            UserColumn::Login => self.login = value,
            UserColumn::Firstname => self.firstname = value,
            UserColumn::Lastname => self.lastname = value,
            UserColumn::Gender => self.gender = Some(value),
            UserColumn::City => self.city = Some(value),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PostStore {
    docs: Arc<RwLock<HashMap<Uuid, PostDocument>>>,
}

impl PostStore {
    pub async fn insert(&self, doc: PostDocument) {
        self.docs.write().await.insert(doc.id, doc);
    }

    pub async fn find(&self, id: Uuid) -> Option<PostDocument> {
        self.docs.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<PostDocument> {
        self.docs.write().await.remove(&id)
    }

    pub fn insert_blocking(&self, doc: PostDocument) {
        self.docs.blocking_write().insert(doc.id, doc);
    }

    pub fn find_blocking(&self, id: Uuid) -> Option<PostDocument> {
        self.docs.blocking_read().get(&id).cloned()
    }

    /// All documents written by `id_user`.
    pub fn find_by_user_blocking(&self, id_user: i64) -> Vec<PostDocument> {
        self.docs
            .blocking_read()
            .values()
            .filter(|doc| doc.id_user == id_user)
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserStore {
    rows: Arc<RwLock<BTreeMap<i64, UserRow>>>,
}

impl UserStore {
    pub async fn select(&self, id: i64) -> Option<UserRow> {
        self.rows.read().await.get(&id).cloned()
    }

    pub async fn exists(&self, id: i64) -> bool {
        self.rows.read().await.contains_key(&id)
    }

    /// Apply all `changes` to one row and bump `edit_date`. Returns `false`
    /// if the row does not exist.
    pub async fn update(&self, id: i64, changes: Vec<(UserColumn, String)>) -> bool {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return false;
        };
        for (column, value) in changes {
            row.set(column, value);
        }
        row.edit_date = Utc::now();
        true
    }

    pub fn insert_blocking(&self, row: UserRow) {
        self.rows.blocking_write().insert(row.id, row);
    }

    pub fn select_blocking(&self, id: i64) -> Option<UserRow> {
        self.rows.blocking_read().get(&id).cloned()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl SessionStore {
    pub async fn issue(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        token
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.contains(token)
    }
}

/// Shared state behind the router.
#[derive(Clone, Debug)]
pub struct AppState {
    pub posts: PostStore,
    pub users: UserStore,
    pub sessions: SessionStore,
    login: Arc<(String, String)>,
}

impl AppState {
    /// Empty stores plus the user described by `config`.
    pub fn seeded(config: &ServerConfig) -> Self {
        let now = Utc::now();
        let user = UserRow {
            id: config.user_id,
            create_date: now,
            edit_date: now,
            login: config.login.clone(),
            password: config.password.clone(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            gender: Some("male".to_string()),
            city: Some("Moscow".to_string()),
        };
        let mut rows = BTreeMap::new();
        rows.insert(user.id, user);

        Self {
            posts: PostStore::default(),
            users: UserStore {
                rows: Arc::new(RwLock::new(rows)),
            },
            sessions: SessionStore::default(),
            login: Arc::new((config.login.clone(), config.password.clone())),
        }
    }

    pub fn credentials_match(&self, login: &str, password: &str) -> bool {
        let (expected_login, expected_password) = &*self.login;
        expected_login == login && expected_password == password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_paths_map_to_columns() {
        assert_eq!(
            UserColumn::from_patch_path("/firstname"),
            Some(UserColumn::Firstname)
        );
        assert_eq!(UserColumn::from_patch_path("/LastName"), Some(UserColumn::Lastname));
        assert_eq!(UserColumn::from_patch_path("/password"), None);
        assert_eq!(UserColumn::from_patch_path("/id"), None);
    }

    #[test]
    fn seeded_state_has_configured_user() {
        let config = ServerConfig::default();
        let state = AppState::seeded(&config);
        let row = state.users.select_blocking(config.user_id).unwrap();
        assert_eq!(row.login, "123");
        assert!(state.credentials_match("123", "123123123"));
        assert!(!state.credentials_match("123", "wrong"));
    }

    #[test]
    fn user_row_never_serializes_password() {
        let state = AppState::seeded(&ServerConfig::default());
        let row = state.users.select_blocking(2).unwrap();
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["firstname"], "Test");
        assert!(json.get("createDate").is_some());
    }

    #[test]
    fn post_store_blocking_round_trip() {
        let store = PostStore::default();
        let doc = PostDocument::new(2, "hello");
        store.insert_blocking(doc.clone());
        assert_eq!(store.find_blocking(doc.id), Some(doc.clone()));
        assert_eq!(store.find_by_user_blocking(2), vec![doc]);
        assert!(store.find_by_user_blocking(3).is_empty());
    }

    #[tokio::test]
    async fn update_touches_only_existing_rows() {
        let state = AppState::seeded(&ServerConfig::default());
        assert!(
            state
                .users
                .update(2, vec![(UserColumn::City, "Kazan".to_string())])
                .await
        );
        assert_eq!(state.users.select(2).await.unwrap().city.as_deref(), Some("Kazan"));
        assert!(!state.users.update(99, Vec::new()).await);
    }
}
