use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::orchestrator::DEFAULT_DEBOUNCE;
use crate::transport::{SortOption, DEFAULT_BASE_URL};

const DEFAULT_ENV_PREFIX: &str = "MOLT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("molt/{}", crate::VERSION)
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default)]
    pub sort: SortOption,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sort: SortOption::default(),
            limit: default_limit(),
        }
    }
}

fn default_limit() -> u32 {
    crate::api::DEFAULT_FEED_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_debounce", with = "humantime_serde")]
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
        }
    }
}

fn default_debounce() -> Duration {
    DEFAULT_DEBOUNCE
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    let path = options.config_file.or_else(default_config_path);
    if let Some(path) = path.filter(|p| p.exists()) {
        let from_file = read_config_file(&path)?;
        cfg = merge_config(cfg, from_file);
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, &load_env(prefix));

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.api.base_url.trim().is_empty() {
        base.api.base_url = other.api.base_url;
    }
    if !other.api.user_agent.trim().is_empty() {
        base.api.user_agent = other.api.user_agent;
    }
    if !other.api.timeout.is_zero() {
        base.api.timeout = other.api.timeout;
    }

    base.feed.sort = other.feed.sort;
    if other.feed.limit != 0 {
        base.feed.limit = other.feed.limit;
    }

    // Zero is a legitimate debounce: search on every keystroke.
    base.search.debounce = other.search.debounce;

    base
}

fn load_env(prefix: &str) -> HashMap<String, String> {
    let upper_prefix = format!("{}_", prefix.to_uppercase());
    env::vars()
        .filter_map(|(key, value)| {
            key.strip_prefix(&upper_prefix)
                .map(|stripped| (stripped.to_ascii_lowercase().replace("__", "."), value))
        })
        .collect()
}

// Environment values are applied field by field so unset keys keep whatever
// the file provided.
fn apply_env(cfg: &mut Config, vars: &HashMap<String, String>) {
    for (key, value) in vars {
        apply_env_value(cfg, key, value);
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: &str) {
    match key {
        "api.base_url" => cfg.api.base_url = value.to_string(),
        "api.user_agent" => cfg.api.user_agent = value.to_string(),
        "api.timeout" => {
            if let Ok(duration) = humantime::parse_duration(value) {
                cfg.api.timeout = duration;
            }
        }
        "feed.sort" => {
            if let Some(sort) = SortOption::from_key(value) {
                cfg.feed.sort = sort;
            }
        }
        "feed.limit" => {
            if let Ok(parsed) = value.parse::<u32>() {
                cfg.feed.limit = parsed;
            }
        }
        "search.debounce" => {
            if let Ok(duration) = humantime::parse_duration(value) {
                cfg.search.debounce = duration;
            }
        }
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("molt").join("config.yaml"))
}
