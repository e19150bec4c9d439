use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chirpy_crypto::{SessionConfig, DEFAULT_ISSUER, DEFAULT_TOKEN_LIFETIME};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Words masked in chirp bodies unless configured otherwise.
pub const DEFAULT_BANNED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Server settings, loadable from TOML. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON document holding all chirps and users.
    pub database_path: PathBuf,
    /// Directory served under `/app/`. Must not contain `database_path`.
    pub static_root: PathBuf,
    pub token_issuer: String,
    /// Token lifetime when a login does not ask for one.
    pub default_token_lifetime_secs: u64,
    /// Maximum chirp length in characters.
    pub max_chirp_length: usize,
    pub banned_words: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: PathBuf::from("database.json"),
            static_root: PathBuf::from("public"),
            token_issuer: DEFAULT_ISSUER.to_string(),
            default_token_lifetime_secs: DEFAULT_TOKEN_LIFETIME.as_secs(),
            max_chirp_length: 140,
            banned_words: DEFAULT_BANNED_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.max_chirp_length == 0 {
            return Err(ServerError::Config("max_chirp_length must be positive".into()));
        }
        if self.token_issuer.trim().is_empty() {
            return Err(ServerError::Config("token_issuer must not be empty".into()));
        }
        if self.default_token_lifetime_secs == 0 {
            return Err(ServerError::Config(
                "default_token_lifetime_secs must be positive".into(),
            ));
        }
        let database = resolve_path(&self.database_path)?;
        let static_root = resolve_path(&self.static_root)?;
        if database.starts_with(&static_root) {
            return Err(ServerError::Config(format!(
                "database_path {} lies inside static_root {} and would be served publicly",
                self.database_path.display(),
                self.static_root.display()
            )));
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            issuer: self.token_issuer.clone(),
            default_lifetime: Duration::from_secs(self.default_token_lifetime_secs),
        }
    }
}

/// Absolute form of `path` with symlinks resolved in its longest existing
/// prefix.
fn resolve_path(path: &Path) -> ServerResult<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            return Ok(missing.iter().rev().fold(canonical, |acc, part| acc.join(part)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(absolute.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.default_token_lifetime_secs, 90);
        assert_eq!(c.max_chirp_length, 140);
        assert_eq!(c.banned_words, vec!["kerfuffle", "sharbert", "fornax"]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            database_path = "/var/lib/chirpy/db.json"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.database_path, PathBuf::from("/var/lib/chirpy/db.json"));
        assert_eq!(c.max_chirp_length, 140);
        assert_eq!(c.token_issuer, "chirpy");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            ServerConfig::from_toml_str("max_chirp_length = 0"),
            Err(ServerError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str("bind_addr = \"nope\""),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn database_inside_static_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let inside = ServerConfig {
            static_root: dir.path().to_path_buf(),
            database_path: dir.path().join("database.json"),
            ..ServerConfig::default()
        };
        assert!(matches!(inside.validate(), Err(ServerError::Config(_))));

        let nested = ServerConfig {
            static_root: dir.path().to_path_buf(),
            database_path: dir.path().join("data").join("db.json"),
            ..ServerConfig::default()
        };
        assert!(matches!(nested.validate(), Err(ServerError::Config(_))));

        let apart = ServerConfig {
            static_root: dir.path().join("public"),
            database_path: dir.path().join("database.json"),
            ..ServerConfig::default()
        };
        assert!(apart.validate().is_ok());
    }

    #[test]
    fn default_layout_keeps_database_out_of_static_root() {
        let c = ServerConfig::default();
        assert_eq!(c.static_root, PathBuf::from("public"));
        assert!(!c.database_path.starts_with(&c.static_root));
    }

    #[test]
    fn session_config_follows_settings() {
        let c = ServerConfig {
            token_issuer: "test".into(),
            default_token_lifetime_secs: 3600,
            ..ServerConfig::default()
        };
        let s = c.session_config();
        assert_eq!(s.issuer, "test");
        assert_eq!(s.default_lifetime, Duration::from_secs(3600));
    }
}
