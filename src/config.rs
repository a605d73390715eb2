use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

/// Backend `MAX_CONTENT_LENGTH`.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_upload_bytes: u64,
    pub user_agent: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            user_agent: concat!("elite-panel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PanelConfig {
    /// Load from an explicit file (must exist) or the default location (may be absent),
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file: {}", path.display()))
    }

    /// Environment overrides; `lookup` is injected so tests need not touch the process env.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(u) = lookup("ELITE_PANEL_URL").filter(|s| !s.trim().is_empty()) { self.base_url = u; }
        if let Some(k) = lookup("ELITE_PANEL_KEY") { self.api_key = Some(k); }
        if let Some(t) = lookup("ELITE_PANEL_TIMEOUT_SECS") {
            self.timeout_secs = Some(t.trim().parse().with_context(|| format!("invalid ELITE_PANEL_TIMEOUT_SECS: {t}"))?);
        }
        if let Some(m) = lookup("ELITE_PANEL_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = m.trim().parse().with_context(|| format!("invalid ELITE_PANEL_MAX_UPLOAD_BYTES: {m}"))?;
        }
        Ok(())
    }

    /// Parsed base URL, always ending in `/` so joins keep any path prefix.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') { raw.push('/'); }
        let url = Url::parse(&raw).with_context(|| format!("invalid base URL: {}", self.base_url))?;
        if url.cannot_be_a_base() { bail!("base URL cannot be used as a base: {}", self.base_url); }
        Ok(url)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("dev", "elite", "elite-panel")?;
    Some(proj.config_dir().join("panel.toml"))
}
