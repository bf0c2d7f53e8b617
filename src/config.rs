use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BASE_URL_ENV: &str = "FRIENDFORCE_BASE_URL";
pub const SESSION_ENV: &str = "FRIENDFORCE_SESSION";

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_api_prefix() -> String {
    "/api/friendforce".into()
}

fn default_csrf_cookie_name() -> String {
    "csrftoken".into()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    /// Raw `name=value` cookie seeded into the jar, e.g. a session id copied
    /// from a browser.
    pub session_cookie: Option<String>,
    pub csrf_cookie_name: String,
    pub debug_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            session_cookie: None,
            csrf_cookie_name: default_csrf_cookie_name(),
            debug_logging: false,
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("friendforce")
            .join("config.json")
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable, then apply environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(session) = lookup(SESSION_ENV).filter(|v| !v.trim().is_empty()) {
            self.session_cookie = Some(session.trim().to_string());
        }
    }

    /// Base URL joined with the API prefix, without a trailing slash.
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    /// Write the defaults to `path` unless a file is already there, so a
    /// first run leaves behind a config to edit. Returns whether it wrote.
    pub fn write_default_if_missing(path: &Path) -> std::io::Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save(path)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(true)
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
