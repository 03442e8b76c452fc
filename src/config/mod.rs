//! Configuration management for the crammer pipeline
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Components never read ambient process state
//! directly: the `Config` struct is built once at startup and passed in.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generative-text service configuration
    pub generator: GeneratorConfig,

    /// Notification dispatch configuration
    pub dispatch: DispatchConfig,

    /// Topic rotation and persistence configuration
    pub schedule: ScheduleConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Generative-text service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Service base URL
    pub endpoint: String,

    /// Model resource name (e.g. "models/gemini-2.5-flash")
    pub model: String,

    /// API key; opaque secret, normally supplied via GOOGLE_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,

    /// Number of questions requested per packet
    pub question_count: usize,
}

/// Notification dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Webhook endpoints; normally supplied comma-separated via
    /// DINGTALK_WEBHOOK
    #[serde(default)]
    pub webhooks: Vec<String>,

    /// Static front-end page that renders the saved packet
    pub page_url: String,

    /// Exam reference month (1-12)
    pub exam_month: u32,

    /// Exam reference day of month
    pub exam_day: u32,

    /// Per-send timeout in seconds
    pub timeout_secs: u64,
}

/// Topic rotation and persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Rotation state file path
    pub state_path: PathBuf,

    /// Directory for persisted packet artifacts
    pub packet_dir: PathBuf,

    /// Pool overrides keyed by month number ("1"-"12") or "default"
    #[serde(default)]
    pub pools: BTreeMap<String, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// Secrets (API key, webhook list) and the exam date still overlay from
    /// the environment so they never have to live in the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables onto the current values
    fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var("CRAMMER_GENERATOR_ENDPOINT") {
            self.generator.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("CRAMMER_MODEL") {
            self.generator.model = model;
        }
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.generator.api_key = key;
        }
        if let Ok(timeout) = std::env::var("CRAMMER_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.generator.timeout_secs = secs;
            }
        }

        if let Ok(raw) = std::env::var("DINGTALK_WEBHOOK") {
            self.dispatch.webhooks = parse_webhook_list(&raw);
        }
        if let Ok(url) = std::env::var("CRAMMER_PAGE_URL") {
            self.dispatch.page_url = url;
        }
        // EXAM_DATE format: YYYY-MM-DD; only month and day are used, the
        // countdown re-anchors the year every run.
        if let Ok(raw) = std::env::var("EXAM_DATE") {
            if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                use chrono::Datelike;
                self.dispatch.exam_month = date.month();
                self.dispatch.exam_day = date.day();
            }
        }

        if let Ok(path) = std::env::var("CRAMMER_STATE_PATH") {
            self.schedule.state_path = path.into();
        }
        if let Ok(dir) = std::env::var("CRAMMER_PACKET_DIR") {
            self.schedule.packet_dir = dir.into();
        }

        if let Ok(level) = std::env::var("CRAMMER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CRAMMER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.generator.timeout_secs == 0 {
            anyhow::bail!("generator.timeout_secs must be greater than 0");
        }
        if self.generator.question_count == 0 {
            anyhow::bail!("generator.question_count must be greater than 0");
        }
        if !(1..=12).contains(&self.dispatch.exam_month) {
            anyhow::bail!("dispatch.exam_month must be 1-12");
        }
        // 2024 is a leap year, so every representable month/day pair passes.
        if NaiveDate::from_ymd_opt(2024, self.dispatch.exam_month, self.dispatch.exam_day).is_none()
        {
            anyhow::bail!(
                "dispatch.exam_day {} is not valid for month {}",
                self.dispatch.exam_day,
                self.dispatch.exam_month
            );
        }
        if self.dispatch.timeout_secs == 0 {
            anyhow::bail!("dispatch.timeout_secs must be greater than 0");
        }
        url::Url::parse(&self.dispatch.page_url)
            .with_context(|| format!("dispatch.page_url is not a URL: {}", self.dispatch.page_url))?;
        for webhook in &self.dispatch.webhooks {
            let parsed = url::Url::parse(webhook)
                .with_context(|| format!("webhook is not a URL: {webhook}"))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                anyhow::bail!("webhook must be http(s): {webhook}");
            }
        }
        for (key, pool) in &self.schedule.pools {
            if key != "default" && key.parse::<u32>().map_or(true, |m| !(1..=12).contains(&m)) {
                anyhow::bail!("pool key must be \"default\" or a month 1-12: {key}");
            }
            if pool.is_empty() {
                anyhow::bail!("pool '{key}' is empty");
            }
        }
        Ok(())
    }

    /// Get the generator request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generator.timeout_secs)
    }

    /// Get the per-send dispatch timeout as Duration
    #[must_use]
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch.timeout_secs)
    }
}

/// Split a comma-separated webhook list, dropping empty entries
pub fn parse_webhook_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig {
                endpoint: String::from("https://generativelanguage.googleapis.com"),
                model: String::from("models/gemini-2.5-flash"),
                api_key: String::new(),
                timeout_secs: 30,
                temperature: 0.4,
                max_output_tokens: 2048,
                question_count: 4,
            },
            dispatch: DispatchConfig {
                webhooks: Vec::new(),
                page_url: String::from("https://liuxuisme.github.io/daily-soft-exam"),
                exam_month: 5,
                exam_day: 24,
                timeout_secs: 10,
            },
            schedule: ScheduleConfig {
                state_path: PathBuf::from("data/rotation_state.json"),
                packet_dir: PathBuf::from("output/packets"),
                pools: BTreeMap::new(),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
