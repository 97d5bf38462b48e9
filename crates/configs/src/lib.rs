use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), log_format: default_log_format() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Redis,
    #[default]
    File,
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "file" => Ok(Self::File),
            other => Err(anyhow!("unknown storage backend `{}` (expected redis or file)", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub redis_url: Option<String>,
    /// KV key holding the whole document
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: BackendKind::File, redis_url: None, key: default_key(), file_path: default_file_path() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Accept `Authorization: Bearer ` with an empty token when some user has an empty token.
    #[serde(default)]
    pub allow_empty_token: bool,
}

fn default_log_format() -> String { "compact".into() }
fn default_key() -> String { "users".into() }
fn default_file_path() -> String { "mydb".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// The file at `path`, or [`from_env`] when no such file exists. A file that is
/// present but unreadable or not valid TOML is an error.
pub fn load_or_env(path: &str) -> Result<AppConfig> {
    match load_from_file(path) {
        Ok(cfg) => Ok(cfg),
        Err(e) if is_missing_file(&e) => from_env(),
        Err(e) => Err(e.context(format!("failed to load config from {}", path))),
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

/// Defaults overridden by `SERVER_HOST`, `SERVER_PORT`, `STORAGE_BACKEND`,
/// `REDIS_URL`, `DATABASE_FILE`, `ALLOW_EMPTY_TOKEN`.
pub fn from_env() -> Result<AppConfig> {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Ok(port) = std::env::var("SERVER_PORT") {
        cfg.server.port = port.parse().map_err(|_| anyhow!("SERVER_PORT must be a port number"))?;
    }
    if let Ok(w) = std::env::var("TOKIO_WORKER_THREADS") {
        cfg.server.worker_threads = w.parse().ok();
    }
    if let Ok(format) = std::env::var("LOG_FORMAT") {
        cfg.server.log_format = format;
    }
    if let Ok(backend) = std::env::var("STORAGE_BACKEND") {
        cfg.storage.backend = backend.parse()?;
    }
    if let Ok(path) = std::env::var("DATABASE_FILE") {
        cfg.storage.file_path = path;
    }
    if let Ok(v) = std::env::var("ALLOW_EMPTY_TOKEN") {
        cfg.auth.allow_empty_token = matches!(v.as_str(), "1" | "true" | "yes");
    }
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, environment otherwise; then normalized and validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_env(&config_path())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        // REDIS_URL fills in a missing redis_url
        if self.redis_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            self.redis_url = std::env::var("REDIS_URL").ok().filter(|u| !u.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(anyhow!("storage.key must not be empty"));
        }
        match self.backend {
            BackendKind::Redis => {
                let url = self
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("storage.redis_url is empty; set it in config.toml or REDIS_URL"))?;
                let lower = url.to_lowercase();
                if !(lower.starts_with("redis://") || lower.starts_with("rediss://") || lower.starts_with("unix://")) {
                    return Err(anyhow!("storage.redis_url must start with redis://, rediss:// or unix://"));
                }
            }
            BackendKind::File => {
                if self.file_path.trim().is_empty() {
                    return Err(anyhow!("storage.file_path must not be empty"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() -> Result<()> {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [storage]
            backend = "redis"
            redis_url = "redis://localhost:6379/0"

            [auth]
            allow_empty_token = true
            "#,
        )?;
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.log_format, "compact");
        assert_eq!(cfg.storage.backend, BackendKind::Redis);
        assert_eq!(cfg.storage.key, "users");
        assert!(cfg.auth.allow_empty_token);
        cfg.storage.validate()?;
        Ok(())
    }

    #[test]
    fn defaults_to_file_backend() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.storage.backend, BackendKind::File);
        assert_eq!(cfg.storage.file_path, "mydb");
        assert!(!cfg.auth.allow_empty_token);
        Ok(())
    }

    #[test]
    fn rejects_bad_storage_settings() {
        let bad_scheme = StorageConfig {
            backend: BackendKind::Redis,
            redis_url: Some("http://localhost".into()),
            ..StorageConfig::default()
        };
        assert!(bad_scheme.validate().is_err());

        let empty_key = StorageConfig { key: " ".into(), ..StorageConfig::default() };
        assert!(empty_key.validate().is_err());
    }

    fn temp_config(contents: &str) -> std::io::Result<std::path::PathBuf> {
        let path = std::env::temp_dir().join(format!("configs_{}_{}.toml", std::process::id(), contents.len()));
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn broken_config_file_is_an_error() -> Result<()> {
        let path = temp_config("[storage]\nbackend = \"redis\"\nredis_url = \"redis://x:6379\"\nkey = \n")?;
        std::env::set_var("CONFIG_PATH", &path);
        let loaded = AppConfig::load_and_validate();
        std::env::remove_var("CONFIG_PATH");
        let _ = std::fs::remove_file(&path);

        let err = loaded.expect_err("a config.toml with a syntax error must not fall back to defaults");
        assert!(err.to_string().contains("failed to load config"));
        Ok(())
    }

    #[test]
    fn missing_config_file_falls_back_to_env() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("configs_absent_{}", std::process::id()));
        let cfg = load_or_env(&dir.join("config.toml").to_string_lossy())?;
        assert_eq!(cfg.storage.key, "users");
        Ok(())
    }

    #[test]
    fn backend_kind_from_str() {
        assert_eq!("Redis".parse::<BackendKind>().ok(), Some(BackendKind::Redis));
        assert_eq!("file".parse::<BackendKind>().ok(), Some(BackendKind::File));
        assert!("mongo".parse::<BackendKind>().is_err());
    }
}
