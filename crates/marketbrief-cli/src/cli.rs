//! Command-line arguments.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Fetch, render and write today's report |
//!
//! Flags override the matching environment settings for one run:
//!
//! ```bash
//! marketbrief run
//! marketbrief run --date 2024-05-01 --dpi 150 --output-dir /tmp/brief
//! marketbrief run --indicators us_gdp,us_cpi --markets ^GSPC,^N225
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use marketbrief_core::{parse_day, PipelineConfig, SeriesId};
use time::Date;

/// Daily economic and market brief.
#[derive(Debug, Parser)]
#[command(name = "marketbrief", author, version, about = "Daily economic and market brief")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every configured series, render charts and write the report.
    ///
    /// Exit codes: 0 when every series was fetched, 3 when the report is
    /// partial, 2 for configuration errors, 10 for I/O failures.
    Run(RunArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Directory for charts and report files (GRAPH_OUTPUT_DIR).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Render resolution (GRAPH_DPI).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub dpi: Option<u32>,

    /// Report date, YYYY-MM-DD (REPORT_DATE). Defaults to today in UTC.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,

    /// Comma-separated indicator identifiers (DEFAULT_INDICATORS).
    #[arg(long, value_delimiter = ',', value_parser = parse_identifier)]
    pub indicators: Option<Vec<SeriesId>>,

    /// Comma-separated market identifiers (DEFAULT_MARKET_INDICES).
    #[arg(long, value_delimiter = ',', value_parser = parse_identifier)]
    pub markets: Option<Vec<SeriesId>>,
}

impl RunArgs {
    pub fn apply(self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(date) = self.date {
            config.report_date = Some(date);
        }
        if let Some(indicators) = self.indicators {
            config.indicators = indicators;
        }
        if let Some(markets) = self.markets {
            config.markets = markets;
        }
        config
    }
}

fn parse_date(value: &str) -> Result<Date, String> {
    parse_day(value).map_err(|error| error.to_string())
}

fn parse_identifier(value: &str) -> Result<SeriesId, String> {
    SeriesId::parse(value).map_err(|error| error.to_string())
}
