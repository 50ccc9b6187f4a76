//! Client-side settings.
//!
//! Defaults are merged with `TRACE_`-prefixed environment variables, e.g.
//! `TRACE_BASE_URL=http://10.0.0.5:5000` or `TRACE_USER_ID=7`.

use std::time::Duration;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::types::Credentials;

pub const ENV_PREFIX: &str = "TRACE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base address of the API under test.
    pub base_url: String,
    pub login: String,
    pub password: String,
    /// User the scenarios act as and inspect.
    pub user_id: i64,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            login: "123".to_string(),
            password: "123123123".to_string(),
            user_id: 2,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            login: self.login.clone(),
            password: self.password.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|_jail| {
            assert_eq!(Settings::load()?, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("TRACE_BASE_URL", "http://10.0.0.5:5000");
            jail.set_env("TRACE_USER_ID", "7");
            jail.set_env("TRACE_TIMEOUT_SECS", "5");

            let settings = Settings::load()?;
            assert_eq!(settings.base_url, "http://10.0.0.5:5000");
            assert_eq!(settings.user_id, 7);
            assert_eq!(settings.timeout(), Duration::from_secs(5));
            assert_eq!(settings.login, "123");
            Ok(())
        });
    }

    #[test]
    fn invalid_value_is_reported() {
        Jail::expect_with(|jail| {
            jail.set_env("TRACE_USER_ID", "not-a-number");
            assert!(Settings::load().is_err());
            Ok(())
        });
    }
}
