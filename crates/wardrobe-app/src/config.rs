//! Environment configuration.
//!
//! | variable                      | default                          |
//! |-------------------------------|----------------------------------|
//! | `DATABASE_URL`                | `postgres://localhost/wardrobe`  |
//! | `WARDROBE_USER_ID`            | none                             |
//! | `WARDROBE_STORAGE_PATH`       | `/var/lib/wardrobe/images`       |
//! | `WARDROBE_PUBLIC_BASE_URL`    | `http://localhost:3000/images`   |
//! | `WARDROBE_MAX_IMAGE_BYTES`    | 10 MiB                           |
//! | `WARDROBE_DB_MAX_CONNECTIONS` | 10                               |

use std::path::PathBuf;
use std::str::FromStr;

use uuid::Uuid;

use wardrobe_core::{defaults, Error, Result};
use wardrobe_db::pool::DEFAULT_MAX_CONNECTIONS;
use wardrobe_db::PoolConfig;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_USER_ID: &str = "WARDROBE_USER_ID";
pub const ENV_STORAGE_PATH: &str = "WARDROBE_STORAGE_PATH";
pub const ENV_PUBLIC_BASE_URL: &str = "WARDROBE_PUBLIC_BASE_URL";
pub const ENV_MAX_IMAGE_BYTES: &str = "WARDROBE_MAX_IMAGE_BYTES";
pub const ENV_DB_MAX_CONNECTIONS: &str = "WARDROBE_DB_MAX_CONNECTIONS";

/// Runtime configuration for the wardrobe binary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    /// Acting user; commands that touch user data fail without one.
    pub user_id: Option<Uuid>,
    pub storage_path: PathBuf,
    pub public_base_url: String,
    pub max_image_bytes: u64,
    pub db_max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: defaults::DATABASE_URL.to_string(),
            user_id: None,
            storage_path: PathBuf::from(defaults::STORAGE_PATH),
            public_base_url: defaults::PUBLIC_BASE_URL.to_string(),
            max_image_bytes: defaults::MAX_IMAGE_BYTES,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: get(ENV_DATABASE_URL).unwrap_or(defaults.database_url),
            user_id: get(ENV_USER_ID)
                .map(|v| parse_var(ENV_USER_ID, &v))
                .transpose()?,
            storage_path: get(ENV_STORAGE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            public_base_url: get(ENV_PUBLIC_BASE_URL).unwrap_or(defaults.public_base_url),
            max_image_bytes: get(ENV_MAX_IMAGE_BYTES)
                .map(|v| parse_var(ENV_MAX_IMAGE_BYTES, &v))
                .transpose()?
                .unwrap_or(defaults.max_image_bytes),
            db_max_connections: get(ENV_DB_MAX_CONNECTIONS)
                .map(|v| parse_var(ENV_DB_MAX_CONNECTIONS, &v))
                .transpose()?
                .unwrap_or(defaults.db_max_connections),
        })
    }

    /// The acting user, or a configuration error naming how to set one.
    pub fn require_user(&self) -> Result<Uuid> {
        self.user_id.ok_or_else(|| {
            Error::Config(format!("No user configured; set {} or pass --user", ENV_USER_ID))
        })
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new().max_connections(self.db_max_connections)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?}: {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.require_user().is_err());
    }

    #[test]
    fn test_reads_all_variables() {
        let user = Uuid::new_v4();
        let user_str = user.to_string();
        let config = config_from(&[
            (ENV_DATABASE_URL, "postgres://db/wardrobe"),
            (ENV_USER_ID, &user_str),
            (ENV_STORAGE_PATH, "/tmp/images"),
            (ENV_PUBLIC_BASE_URL, "https://cdn.example"),
            (ENV_MAX_IMAGE_BYTES, "2048"),
            (ENV_DB_MAX_CONNECTIONS, "3"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "postgres://db/wardrobe");
        assert_eq!(config.require_user().unwrap(), user);
        assert_eq!(config.storage_path, PathBuf::from("/tmp/images"));
        assert_eq!(config.public_base_url, "https://cdn.example");
        assert_eq!(config.max_image_bytes, 2048);
        assert_eq!(config.pool_config().max_connections, 3);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[(ENV_DATABASE_URL, "  "), (ENV_USER_ID, "")]).unwrap();
        assert_eq!(config.database_url, defaults::DATABASE_URL);
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_malformed_values_are_config_errors() {
        let err = config_from(&[(ENV_USER_ID, "not-a-uuid")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(ENV_USER_ID));

        let err = config_from(&[(ENV_MAX_IMAGE_BYTES, "lots")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
