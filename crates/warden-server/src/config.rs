use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};
use warden_core::{ConfigError, TokenConfig, parse_duration};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret. For security: prefer setting env var `WARDEN_JWT_SECRET`.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// File holding the signing secret, used when `jwt_secret` is unset.
    #[serde(default)]
    pub jwt_secret_file: Option<PathBuf>,

    /// Access token lifetime, e.g. "15m".
    #[serde(default = "default_access_ttl")]
    pub access_ttl: String,

    /// Refresh token lifetime, e.g. "168h".
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl: String,

    /// How often expired revocations are swept, e.g. "60s".
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: String,
}

fn default_access_ttl() -> String {
    "15m".to_string()
}

fn default_refresh_ttl() -> String {
    "168h".to_string()
}

fn default_sweep_interval() -> String {
    "60s".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_secret_file: None,
            access_ttl: default_access_ttl(),
            refresh_ttl: default_refresh_ttl(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret_file", &self.jwt_secret_file)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

impl AuthConfig {
    /// Resolve the signing secret from the inline value or the secret file.
    pub fn resolve_secret(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(secret) = &self.jwt_secret {
            if !secret.is_empty() {
                return Ok(Some(secret.clone()));
            }
        }

        if let Some(path) = &self.jwt_secret_file {
            let secret = fs::read_to_string(path)?;
            let secret = secret.trim();
            if !secret.is_empty() {
                return Ok(Some(secret.to_string()));
            }
        }

        Ok(None)
    }

    /// Build and validate the token core settings.
    pub fn token_config(&self) -> anyhow::Result<TokenConfig> {
        let secret = self.resolve_secret()?.ok_or(ConfigError::MissingSecret)?;

        let cfg = TokenConfig::new(secret)
            .with_access_ttl(parse_duration("access_ttl", &self.access_ttl)?)
            .with_refresh_ttl(parse_duration("refresh_ttl", &self.refresh_ttl)?)
            .with_sweep_interval(parse_duration("sweep_interval", &self.sweep_interval)?);
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Load `path` if it exists, then apply `WARDEN_*` environment overrides.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let mut cfg = if path.exists() {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw)?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg, |key| env::var(key).ok());
    Ok(cfg)
}

/// Overlay environment values onto a loaded config. `lookup` returns the
/// value of a variable, if set.
pub fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("WARDEN_BIND") {
        cfg.server.bind = v;
    }
    if let Some(v) = lookup("WARDEN_JWT_SECRET") {
        cfg.auth.jwt_secret = Some(v);
    }
    if let Some(v) = lookup("WARDEN_ACCESS_TTL") {
        cfg.auth.access_ttl = v;
    }
    if let Some(v) = lookup("WARDEN_REFRESH_TTL") {
        cfg.auth.refresh_ttl = v;
    }
    if let Some(v) = lookup("WARDEN_SWEEP_INTERVAL") {
        cfg.auth.sweep_interval = v;
    }
}
