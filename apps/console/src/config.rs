use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub grace_period_ms: u64,
    pub default_text: String,
    pub seed_items: Vec<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grace_period_ms: 5_000,
            default_text: "Compose".into(),
            seed_items: Vec::new(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    grace_period_ms: Option<u64>,
    default_text: Option<String>,
    seed_items: Option<Vec<String>>,
    log_filter: Option<String>,
}

/// Defaults, then the TOML file if present, then `APP__*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(err) if explicit => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.grace_period_ms {
        settings.grace_period_ms = v;
    }
    if let Some(v) = file_cfg.default_text {
        settings.default_text = v;
    }
    if let Some(v) = file_cfg.seed_items {
        settings.seed_items = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__GRACE_PERIOD_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.grace_period_ms = parsed;
        }
    }
    if let Some(v) = var("APP__DEFAULT_TEXT") {
        settings.default_text = v;
    }
    if let Some(v) = var("APP__SEED_ITEMS") {
        settings.seed_items = v
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}
