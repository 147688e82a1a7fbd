//! TOML configuration for the credential store.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup:
//!
//! ```toml
//! database_path = "users.dbsp"
//! capacity = 10000
//! iterations = 100000
//! session_entropy_bytes = 4096
//! cookie_name = "session"
//! log_level = "info"
//! ```

use crate::auth::session::DEFAULT_SESSION_ENTROPY_BYTES;
use crate::auth::{DEFAULT_COOKIE_NAME, DEFAULT_ITERATIONS};
use crate::store::DEFAULT_CAPACITY;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `database_path`.
pub const ENV_DB_PATH: &str = "CREDENTIAL_DB_PATH";

/// Overrides `iterations`.
pub const ENV_ITERATIONS: &str = "CREDENTIAL_ITERATIONS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Backing file for the user table.
    pub database_path: PathBuf,
    /// Maximum rows in the user table.
    pub capacity: usize,
    /// PBKDF2 cost for new registrations. Existing accounts keep theirs.
    pub iterations: u32,
    /// Random bytes hashed into each session id.
    pub session_entropy_bytes: usize,
    pub cookie_name: String,
    /// Default tracing filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("users.dbsp"),
            capacity: DEFAULT_CAPACITY,
            iterations: DEFAULT_ITERATIONS,
            session_entropy_bytes: DEFAULT_SESSION_ENTROPY_BYTES,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AuthConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `CREDENTIAL_DB_PATH` and `CREDENTIAL_ITERATIONS` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            self.database_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(ENV_ITERATIONS) {
            self.iterations = raw.trim().parse().with_context(|| {
                format!("{ENV_ITERATIONS} must be a positive integer, got {raw:?}")
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            bail!("capacity must be greater than zero");
        }
        if self.iterations == 0 {
            bail!("iterations must be greater than zero");
        }
        if self.session_entropy_bytes == 0 {
            bail!("session_entropy_bytes must be greater than zero");
        }
        if self.cookie_name.trim().is_empty() {
            bail!("cookie_name cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.database_path, PathBuf::from("users.dbsp"));
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.iterations, 100_000);
        assert_eq!(config.session_entropy_bytes, 4096);
        assert_eq!(config.cookie_name, "session");
        assert_eq!(config.log_level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("credential.toml");
        std::fs::write(&path, "capacity = 50\ncookie_name = \"sid\"\n").unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.iterations, 100_000);
    }

    #[test]
    fn empty_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("credential.toml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(AuthConfig::load(&path).unwrap(), AuthConfig::default());
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = AuthConfig::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("credential.toml");
        std::fs::write(&path, "capacity = \"lots\"").unwrap();
        let err = AuthConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn load_or_default_without_path() {
        assert_eq!(
            AuthConfig::load_or_default(None).unwrap(),
            AuthConfig::default()
        );
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = AuthConfig {
            capacity: 7,
            ..AuthConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: AuthConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> =
            [(ENV_DB_PATH, "/tmp/other.dbsp"), (ENV_ITERATIONS, " 2500 ")].into();
        let mut config = AuthConfig::default();
        config
            .apply_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.dbsp"));
        assert_eq!(config.iterations, 2500);
    }

    #[test]
    fn bad_iterations_override_rejected() {
        let mut config = AuthConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == ENV_ITERATIONS).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_ITERATIONS));
        assert_eq!(config.iterations, 100_000);
    }

    #[test]
    fn validate_rejects_zeroes() {
        for config in [
            AuthConfig {
                capacity: 0,
                ..AuthConfig::default()
            },
            AuthConfig {
                iterations: 0,
                ..AuthConfig::default()
            },
            AuthConfig {
                session_entropy_bytes: 0,
                ..AuthConfig::default()
            },
            AuthConfig {
                cookie_name: " ".into(),
                ..AuthConfig::default()
            },
        ] {
            assert!(config.validate().is_err());
        }
    }
}
