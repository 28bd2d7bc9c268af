use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::Locale;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "moviebot.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub api_prefix: String,
    pub request_timeout_secs: u64,
    pub locale: Locale,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8001".into(),
            api_prefix: "/api".into(),
            request_timeout_secs: 30,
            locale: Locale::Thai,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Backend URL joined with the API prefix, without a trailing slash.
    pub fn api_base(&self) -> anyhow::Result<String> {
        let url = Url::parse(self.backend_url.trim())
            .with_context(|| format!("invalid backend url '{}'", self.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("backend url must use http or https, got '{}'", url.scheme());
        }

        let base = url.as_str().trim_end_matches('/');
        let prefix = self.api_prefix.trim().trim_matches('/');
        if prefix.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{base}/{prefix}"))
        }
    }
}

/// Defaults, then the TOML file, then environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str::<Settings>(raw)?)
}

pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = lookup("APP__API_PREFIX") {
        settings.api_prefix = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS must be whole seconds, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__LOCALE") {
        settings.locale = v.parse().map_err(anyhow::Error::msg)?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
