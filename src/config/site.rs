//! Site configuration (_config.yml)

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound for `session_ttl_hours`: ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    /// Author written into posts that do not name one
    pub author: String,
    pub language: String,
    /// IANA time zone used for "today"; empty means the local zone
    pub timezone: String,

    // Directory
    pub posts_dir: String,
    pub data_dir: String,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,

    // Auth
    pub session_ttl_hours: i64,
    pub allow_registration: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: "博主".to_string(),
            language: "zh-CN".to_string(),
            timezone: String::new(),

            posts_dir: "posts".to_string(),
            data_dir: "data".to_string(),

            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),

            session_ttl_hours: 24 * 30,
            allow_registration: true,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.timezone.is_empty() {
            self.timezone
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.timezone, e))?;
        }
        if self.session_ttl_hours <= 0 || self.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            return Err(anyhow!(
                "session_ttl_hours must be between 1 and {}",
                MAX_SESSION_TTL_HOURS
            ));
        }
        Ok(())
    }

    /// Session lifetime, clamped to `1..=MAX_SESSION_TTL_HOURS` hours
    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }

    /// Clock that answers "what is today" in the configured time zone
    pub fn clock(&self) -> Clock {
        match self.timezone.parse::<Tz>() {
            Ok(tz) if !self.timezone.is_empty() => Clock::Zone(tz),
            _ => Clock::Local,
        }
    }
}

/// Source of the current calendar date
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    Local,
    Zone(Tz),
    /// Pinned date, handy for tests and imports
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Zone(tz) => Utc::now().with_timezone(tz).date_naive(),
            Clock::Fixed(date) => *date,
        }
    }

    /// Today formatted as `YYYY-MM-DD`
    pub fn today_string(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}
