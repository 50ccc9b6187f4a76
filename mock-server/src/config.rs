//! Server settings: defaults merged with `MOCK_`-prefixed environment
//! variables (`MOCK_PORT=5000`, `MOCK_LOGIN=...`).

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Credentials accepted by `POST /users/sign-in`.
    pub login: String,
    pub password: String,
    /// Id of the seeded user the credentials belong to.
    pub user_id: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            login: "123".to_string(),
            password: "123123123".to_string(),
            user_id: 2,
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Env::prefixed("MOCK_"))
            .extract()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
