//! Run configuration.
//!
//! [`PipelineConfig`] is built once at startup and passed by reference into
//! every component. Adapters and renderers never read the environment.

use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use time::Date;

use crate::rate_limit::{RateBudget, RateLimiter};
use crate::retry::RetryPolicy;
use crate::{parse_day, ConfigError, DateRange, GapPolicy, SeriesId, SourceKind};

/// Provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Immutable per-run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub fred_api_key: Option<ApiKey>,
    pub indicators: Vec<SeriesId>,
    pub markets: Vec<SeriesId>,
    pub economic_days: u32,
    pub market_days: u32,
    /// Day the report is for; today (UTC) when unset.
    pub report_date: Option<Date>,
    pub output_dir: PathBuf,
    pub dpi: u32,
    pub indicator_rate: RateBudget,
    pub market_rate: RateBudget,
    pub rate_limit_max_wait: Duration,
    pub max_retries: u32,
    pub fetch_concurrency: usize,
    pub run_deadline: Duration,
    pub max_attachment_bytes: u64,
    pub volume_threshold: f64,
    pub price_change_threshold: f64,
    /// Treatment of absent values before charting.
    pub gap_policy: GapPolicy,
    pub log_level: String,
}

const DEFAULT_INDICATORS: &str = "us_gdp,us_cpi,us_unemployment,us_interest_rate";
const DEFAULT_MARKETS: &str = "^DJI,^GSPC,^IXIC,^N225";

impl PipelineConfig {
    /// Reads the process environment. Call after loading any `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Missing keys take their
    /// defaults; malformed values are errors naming the key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let fred_api_key = get("MARKETBRIEF_FRED_API_KEY")
            .or_else(|| get("FRED_API_KEY"))
            .and_then(ApiKey::new);

        Ok(Self {
            fred_api_key,
            indicators: parse_identifiers(
                "DEFAULT_INDICATORS",
                &get("DEFAULT_INDICATORS").unwrap_or_else(|| DEFAULT_INDICATORS.to_owned()),
            )?,
            markets: parse_identifiers(
                "DEFAULT_MARKET_INDICES",
                &get("DEFAULT_MARKET_INDICES").unwrap_or_else(|| DEFAULT_MARKETS.to_owned()),
            )?,
            economic_days: parse_positive("ECONOMIC_DATA_DAYS", get("ECONOMIC_DATA_DAYS"), 365)?,
            market_days: parse_positive("MARKET_DATA_DAYS", get("MARKET_DATA_DAYS"), 30)?,
            report_date: get("REPORT_DATE")
                .map(|value| {
                    parse_day(&value).map_err(|_| ConfigError::InvalidDate {
                        key: "REPORT_DATE",
                        value,
                    })
                })
                .transpose()?,
            output_dir: PathBuf::from(get("GRAPH_OUTPUT_DIR").unwrap_or_else(|| String::from("graphs"))),
            dpi: parse_positive("GRAPH_DPI", get("GRAPH_DPI"), 300)?,
            indicator_rate: parse_budget("INDICATOR_RATE_LIMIT", get("INDICATOR_RATE_LIMIT"), "120/60s")?,
            market_rate: parse_budget("MARKET_RATE_LIMIT", get("MARKET_RATE_LIMIT"), "60/60s")?,
            rate_limit_max_wait: Duration::from_secs(parse_integer(
                "RATE_LIMIT_MAX_WAIT_SECS",
                get("RATE_LIMIT_MAX_WAIT_SECS"),
                30,
            )?),
            max_retries: parse_integer("FETCH_MAX_RETRIES", get("FETCH_MAX_RETRIES"), 3)?,
            fetch_concurrency: parse_positive("FETCH_CONCURRENCY", get("FETCH_CONCURRENCY"), 4)?,
            run_deadline: Duration::from_secs(parse_positive(
                "RUN_DEADLINE_SECS",
                get("RUN_DEADLINE_SECS"),
                120,
            )?),
            max_attachment_bytes: parse_positive(
                "MAX_ATTACHMENT_BYTES",
                get("MAX_ATTACHMENT_BYTES"),
                20_000_000,
            )?,
            volume_threshold: parse_number("VOLUME_THRESHOLD", get("VOLUME_THRESHOLD"), 2.0)?,
            price_change_threshold: parse_number(
                "PRICE_CHANGE_THRESHOLD",
                get("PRICE_CHANGE_THRESHOLD"),
                0.05,
            )?,
            gap_policy: get("GAP_POLICY")
                .map(|value| {
                    value.parse::<GapPolicy>().map_err(|_| ConfigError::InvalidChoice {
                        key: "GAP_POLICY",
                        value,
                        expected: "drop, preserve",
                    })
                })
                .transpose()?
                .unwrap_or_default(),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| String::from("info")),
        })
    }

    pub fn report_date_or_today(&self) -> Date {
        self.report_date
            .unwrap_or_else(|| time::OffsetDateTime::now_utc().date())
    }

    pub fn economic_range(&self, end: Date) -> DateRange {
        DateRange::trailing_days(end, self.economic_days)
    }

    pub fn market_range(&self, end: Date) -> DateRange {
        DateRange::trailing_days(end, self.market_days)
    }

    /// Remote kinds get their configured budgets; static data is unlimited.
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            [
                (SourceKind::RemoteIndicator, self.indicator_rate),
                (SourceKind::RemoteMarket, self.market_rate),
            ],
            self.rate_limit_max_wait,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.max_retries)
    }
}

fn parse_identifiers(key: &'static str, raw: &str) -> Result<Vec<SeriesId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| SeriesId::parse(item).map_err(|source| ConfigError::InvalidIdentifier { key, source }))
        .collect()
}

fn parse_integer<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidInteger {
            key,
            value: value.clone(),
        }),
    }
}

fn parse_positive<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let value = parse_integer(key, raw, default)?;
    if value <= T::default() {
        return Err(ConfigError::MustBePositive { key });
    }
    Ok(value)
}

fn parse_number(key: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    let parsed = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.clone(),
        })?;
    if parsed <= 0.0 {
        return Err(ConfigError::MustBePositive { key });
    }
    Ok(parsed)
}

fn parse_budget(key: &'static str, raw: Option<String>, default: &str) -> Result<RateBudget, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_owned());
    value.parse::<RateBudget>().map_err(|_| ConfigError::InvalidRateBudget { key, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<PipelineConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        PipelineConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_follow_documented_table() {
        let config = config_from(&[]).expect("defaults parse");

        assert_eq!(config.indicators.len(), 4);
        assert_eq!(config.markets[3].as_str(), "^N225");
        assert_eq!(config.economic_days, 365);
        assert_eq!(config.market_days, 30);
        assert_eq!(config.dpi, 300);
        assert_eq!(config.output_dir, PathBuf::from("graphs"));
        assert_eq!(config.indicator_rate.to_string(), "120/60s");
        assert_eq!(config.rate_limit_max_wait, Duration::from_secs(30));
        assert_eq!(config.max_attachment_bytes, 20_000_000);
        assert!(config.fred_api_key.is_none());
        assert_eq!(config.gap_policy, GapPolicy::Drop);
    }

    #[test]
    fn gap_policy_can_preserve_absent_values() {
        let config = config_from(&[("GAP_POLICY", "Preserve")]).expect("parses");
        assert_eq!(config.gap_policy, GapPolicy::Preserve);
    }

    #[test]
    fn prefixed_key_wins_and_is_redacted() {
        let config = config_from(&[
            ("FRED_API_KEY", "plain"),
            ("MARKETBRIEF_FRED_API_KEY", "prefixed"),
        ])
        .expect("config parses");

        let key = config.fred_api_key.as_ref().expect("key present");
        assert_eq!(key.expose(), "prefixed");
        assert!(!format!("{config:?}").contains("prefixed"));
    }

    #[test]
    fn malformed_values_name_their_key() {
        assert_eq!(
            config_from(&[("GRAPH_DPI", "high")]).expect_err("must fail"),
            ConfigError::InvalidInteger {
                key: "GRAPH_DPI",
                value: String::from("high")
            }
        );
        assert_eq!(
            config_from(&[("FETCH_CONCURRENCY", "0")]).expect_err("must fail"),
            ConfigError::MustBePositive {
                key: "FETCH_CONCURRENCY"
            }
        );
        assert!(matches!(
            config_from(&[("MARKET_RATE_LIMIT", "fast")]),
            Err(ConfigError::InvalidRateBudget {
                key: "MARKET_RATE_LIMIT",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[("INDICATOR_RATE_LIMIT", "1/1e20s")]),
            Err(ConfigError::InvalidRateBudget {
                key: "INDICATOR_RATE_LIMIT",
                ..
            })
        ));
        assert!(matches!(
            config_from(&[("GAP_POLICY", "interpolate")]),
            Err(ConfigError::InvalidChoice { key: "GAP_POLICY", .. })
        ));
        assert!(matches!(
            config_from(&[("DEFAULT_INDICATORS", "us_gdp, bad id")]),
            Err(ConfigError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn identifier_lists_skip_blank_items() {
        let config = config_from(&[("DEFAULT_MARKET_INDICES", "^GSPC,, ^N225 ,")]).expect("parses");
        let tickers: Vec<_> = config.markets.iter().map(SeriesId::as_str).collect();
        assert_eq!(tickers, vec!["^GSPC", "^N225"]);
    }
}
