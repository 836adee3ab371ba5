use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Optional listener for `/healthz` and `/metrics`.
    #[serde(default)]
    pub metrics_addr: Option<String>,
    /// Optional front-end build directory served as a fallback.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8081,
            worker_threads: Some(4),
            metrics_addr: None,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_admin_document")]
    pub admin_document: String,
    /// Written as the admin list on startup when none exists yet.
    #[serde(default)]
    pub seed_admins: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            admin_document: default_admin_document(),
            seed_admins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for bearer tokens; bearer auth is off when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_true")]
    pub trust_username_header: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, trust_username_header: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_root_dir() -> PathBuf { PathBuf::from("config") }
fn default_admin_document() -> String { "admins.json".into() }
fn default_true() -> bool { true }
fn default_log_format() -> String { "compact".into() }

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// `CONFIG_PATH` when set (must exist), otherwise `config.toml`.
pub fn load_default() -> Result<AppConfig> {
    match std::env::var("CONFIG_PATH") {
        Ok(path) => load_from_file(&path),
        Err(_) => load_from_file(DEFAULT_CONFIG_FILE),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("cannot read config file {path}"))?;
    parse(&content).with_context(|| format!("invalid config file {path}"))
}

/// Like `load_from_file`, but an absent file yields the defaults. Any other
/// read or parse error is returned.
pub fn load_optional(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}")),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e).with_context(|| format!("cannot read config file {path}")),
    }
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load the config file, then apply env overrides and validate. Only a
    /// missing default `config.toml` falls back to defaults; an explicit
    /// `CONFIG_PATH` must exist and every parse error is fatal.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match std::env::var("CONFIG_PATH") {
            Ok(path) => load_from_file(&path)?,
            Err(_) => load_optional(DEFAULT_CONFIG_FILE)?,
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply environment overrides (`SERVER_HOST`, `CONFIG_STORE_DIR`, ...).
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Ok(addr) = std::env::var("METRICS_ADDR") {
            self.server.metrics_addr = Some(addr);
        }
        if let Ok(dir) = std::env::var("CONFIG_STORE_DIR") {
            self.store.root_dir = PathBuf::from(dir);
        }
        if self.store.seed_admins.is_empty() {
            if let Ok(users) = std::env::var("ADMIN_USERS") {
                self.store.seed_admins = split_list(&users);
            }
        }
        if self.auth.jwt_secret.is_none() {
            self.auth.jwt_secret = std::env::var("JWT_SECRET").ok();
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 server
        self.server.normalize()?;
        // 校验文档目录与管理员列表文件名
        self.store.validate()?;
        // 空白 secret 视为未配置
        self.auth.normalize();
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
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
        if let Some(addr) = &self.metrics_addr {
            if addr.trim().is_empty() {
                self.metrics_addr = None;
            }
        }
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&mut self) -> Result<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(anyhow!("store.root_dir must not be empty"));
        }
        let admin = self.admin_document.trim();
        if admin.is_empty() || admin.contains(['/', '\\']) {
            return Err(anyhow!("store.admin_document must be a plain file name"));
        }
        self.admin_document = admin.to_string();
        self.seed_admins = self
            .seed_admins
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(())
    }
}

impl AuthConfig {
    fn normalize(&mut self) {
        if matches!(&self.jwt_secret, Some(s) if s.trim().is_empty()) {
            self.jwt_secret = None;
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}
