use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Prefix of the `<script>` body that carries the page state JSON.
    #[serde(default = "default_state_marker")]
    pub state_marker: String,

    #[serde(default)]
    pub sale_selection: SaleSelection,
}

/// Which transaction of a property's sale history counts as "the" sale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleSelection {
    /// `transactions[0]`; the listings site serves history most-recent-first.
    #[default]
    First,
    /// The transaction with the greatest parseable sale date.
    Latest,
}

/// Report configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Recency window in years.
    #[serde(default = "default_years")]
    pub years: u32,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.rightmove.co.uk/house-prices".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "house-prices/0.1 (sold price lookup; one request at a time)".to_string()
}
pub fn default_state_marker() -> String {
    "window.__PRELOADED_STATE__ = ".to_string()
}
fn default_years() -> u32 {
    10
}
fn default_top_n() -> usize {
    5
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("HOUSE_PRICES").separator("__"))
            .build()?;

        Self::from_config(cfg)
    }

    /// Missing keys take their defaults; a present but bad value is an error.
    pub fn from_config(cfg: config::Config) -> Result<Self> {
        cfg.try_deserialize().context("Invalid configuration")
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            state_marker: default_state_marker(),
            sale_selection: SaleSelection::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            years: default_years(),
            top_n: default_top_n(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_sold_prices_listing() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scraper.base_url, "https://www.rightmove.co.uk/house-prices");
        assert_eq!(cfg.scraper.state_marker, "window.__PRELOADED_STATE__ = ");
        assert_eq!(cfg.scraper.sale_selection, SaleSelection::First);
        assert_eq!(cfg.report.years, 10);
        assert_eq!(cfg.report.top_n, 5);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let cfg = config::Config::builder()
            .set_override("report.years", 3)
            .unwrap()
            .build()
            .unwrap();
        let app = AppConfig::from_config(cfg).unwrap();
        assert_eq!(app.report.years, 3);
        assert_eq!(app.report.top_n, 5);
        assert_eq!(app.scraper.sale_selection, SaleSelection::First);
    }

    #[test]
    fn bad_sale_selection_is_an_error() {
        let cfg = config::Config::builder()
            .set_override("report.years", 3)
            .unwrap()
            .set_override("scraper.sale_selection", "lastest")
            .unwrap()
            .build()
            .unwrap();
        assert!(AppConfig::from_config(cfg).is_err());
    }

    #[test]
    fn sale_selection_reads_lowercase_names() {
        let sel: SaleSelection = serde_json::from_str("\"latest\"").unwrap();
        assert_eq!(sel, SaleSelection::Latest);
    }
}
