use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::DEFAULT_TAKE;

const DEFAULT_CONFIG_FILE: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api".into(),
            access_token: None,
            page_size: DEFAULT_TAKE,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Command-line flags win over everything else.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(v) = overrides.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = overrides.access_token {
            self.access_token = Some(v);
        }
        if let Some(v) = overrides.page_size {
            self.page_size = v.max(1);
        }
        if let Some(v) = overrides.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub access_token: Option<String>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    access_token: Option<String>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the config file, then the environment. An explicit
/// `path` must exist; otherwise `console.toml` is read when present.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if let Ok(raw) = fs::read_to_string(&path) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{}'", path.display()))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.access_token {
        settings.access_token = Some(v);
    }
    if let Some(v) = file.page_size {
        settings.page_size = v.max(1);
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

/// `APP__*` names win over the shorter `CONSOLE_*` aliases.
fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("CONSOLE_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("CONSOLE_TOKEN") {
        settings.access_token = Some(v);
    }
    if let Some(v) = lookup("APP__ACCESS_TOKEN") {
        settings.access_token = Some(v);
    }

    if let Some(v) = lookup("APP__PAGE_SIZE") {
        let parsed: u32 = v
            .trim()
            .parse()
            .with_context(|| format!("APP__PAGE_SIZE must be a positive integer, got '{v}'"))?;
        settings.page_size = parsed.max(1);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v.trim().parse().with_context(|| {
            format!("APP__REQUEST_TIMEOUT_SECS must be a number of seconds, got '{v}'")
        })?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
