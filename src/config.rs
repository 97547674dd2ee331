//! Layered settings: defaults, optional TOML file, `PICKS__*` environment
//! variables, then the legacy variable names the deployment already sets.

use crate::catalog::{CatalogConfig, LeagueExclusionFilter, DEFAULT_EXCLUDED_LEAGUES};
use crate::clients::KALSHI_BASE_URL;
use crate::preview::PreviewSettings;
use crate::tiers::Tier;
use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub exchange: ExchangeSettings,
    pub catalog: CatalogSettings,
    pub preview: PreviewSection,
    pub picks: PickSettings,
    pub admin: AdminSettings,
    #[serde(default)]
    pub subscribers: HashMap<String, Tier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Clone, Deserialize)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub api_key_id: String,
    pub private_key: String,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ExchangeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeSettings")
            .field("base_url", &self.base_url)
            .field("api_key_id", &self.api_key_id)
            .field("private_key", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub page_size: u32,
    pub max_pages: u32,
    pub page_delay_ms: u64,
    pub rate_limit_backoff_ms: u64,
    pub excluded_leagues: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewSection {
    pub min_confidence: f64,
    pub max_picks: usize,
    pub default_stake_cents: u32,
    /// Offset used to decide which day's predictions are "today".
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickSettings {
    pub dir: String,
}

#[derive(Clone, Deserialize)]
pub struct AdminSettings {
    pub secret: String,
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("secret", &if self.secret.is_empty() { "<unset>" } else { "<redacted>" })
            .finish()
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| std::env::var(n).ok())
        .find(|v| !v.is_empty())
}

impl Settings {
    /// Load settings. `path` names an optional TOML file (extension optional).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.bind_addr", "0.0.0.0:3008")?
            .set_default("exchange.base_url", KALSHI_BASE_URL)?
            .set_default("exchange.api_key_id", "")?
            .set_default("exchange.private_key", "")?
            .set_default("exchange.request_timeout_secs", 15)?
            .set_default("catalog.page_size", 200)?
            .set_default("catalog.max_pages", 25)?
            .set_default("catalog.page_delay_ms", 150)?
            .set_default("catalog.rate_limit_backoff_ms", 2000)?
            .set_default("catalog.excluded_leagues", DEFAULT_EXCLUDED_LEAGUES)?
            .set_default("preview.min_confidence", 50.0)?
            .set_default("preview.max_picks", 40)?
            .set_default("preview.default_stake_cents", 500)?
            .set_default("preview.utc_offset_hours", -6)?
            .set_default("picks.dir", ".")?
            .set_default("admin.secret", "")?;

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder = builder
            .add_source(Environment::with_prefix("PICKS").separator("__"))
            .set_override_option("exchange.api_key_id", first_env(&["KALSHI_API_KEY_ID"]))?
            .set_override_option("exchange.private_key", first_env(&["KALSHI_PRIVATE_KEY"]))?
            .set_override_option(
                "admin.secret",
                first_env(&["PROGNO_ADMIN_PASSWORD", "ADMIN_PASSWORD", "CRON_SECRET"]),
            )?;

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn catalog_config(&self) -> Result<CatalogConfig> {
        let exclusion = LeagueExclusionFilter::new(&self.catalog.excluded_leagues)
            .with_context(|| format!("Invalid excluded_leagues pattern: {}", self.catalog.excluded_leagues))?;

        Ok(CatalogConfig {
            page_size: self.catalog.page_size,
            max_pages: self.catalog.max_pages,
            page_delay: Duration::from_millis(self.catalog.page_delay_ms),
            rate_limit_backoff: Duration::from_millis(self.catalog.rate_limit_backoff_ms),
            exclusion,
        })
    }

    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            min_confidence: self.preview.min_confidence,
            max_picks: self.preview.max_picks,
            default_stake_cents: self.preview.default_stake_cents,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange.request_timeout_secs)
    }

    pub fn today(&self) -> NaiveDate {
        today_at(self.preview.utc_offset_hours)
    }
}

/// Today's date at a fixed UTC offset; out-of-range offsets fall back to UTC.
pub fn today_at(utc_offset_hours: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_hours.saturating_mul(3600)).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset).date_naive()
}
