//! `salat`: fetch a daily prayer schedule and print the resolved payload as JSON.
//!
//! Usage:
//!   salat https://mawaqit.net/en/friedenmoschee-erlangen
//!   salat --now 2025-06-01T15:00:00+02:00 page.html
//!   curl -s "$URL" | salat --compact -

mod http;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::Parser;
use log::info;
use salat_engine::config::{DEFAULT_DISPLAY_DATE_FORMAT, DEFAULT_ZONE};
use salat_engine::{EngineConfig, ScheduleEngine, SourceFetcher, StaticSource, UnavailableSource};

use crate::http::HttpSource;

const DEFAULT_SOURCE: &str = "https://mawaqit.net/en/friedenmoschee-erlangen";

/// Resolve today's prayer schedule and print it as JSON.
#[derive(Parser, Debug)]
#[command(name = "salat", version)]
#[command(about = "Resolve current and next prayer from a published daily schedule", long_about = None)]
struct Args {
    /// Schedule page: http(s) URL, local file path, or "-" for stdin.
    #[arg(env = "SALAT_SOURCE", default_value = DEFAULT_SOURCE)]
    source: String,

    /// IANA time zone of the schedule.
    #[arg(long = "tz", env = "SALAT_TZ", default_value = DEFAULT_ZONE)]
    zone: String,

    /// Date pattern (chrono strftime) for the displayed date. Repeat to try several in order.
    #[arg(long = "date-format")]
    date_formats: Vec<String>,

    /// Pattern for the payload's human-readable date.
    #[arg(long, default_value = DEFAULT_DISPLAY_DATE_FORMAT)]
    display_format: String,

    /// Reference instant (RFC 3339) instead of the system clock.
    #[arg(long)]
    now: Option<String>,

    /// Fetch timeout in seconds.
    #[arg(long, default_value_t = 45)]
    timeout: u64,

    /// How long the last prayer counts as current when nothing follows it (1 to 1440).
    #[arg(long)]
    open_window_minutes: Option<i64>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let engine = ScheduleEngine::new(build_config(&args)?);
    if args.timeout == 0 {
        bail!("--timeout must be at least one second");
    }
    let now = reference_now(args.now.as_deref())?;

    let fetcher = load_source(&args.source);
    let payload = engine.run(fetcher.as_ref(), Duration::from_secs(args.timeout), &now);
    if let Some(reason) = &payload.error {
        info!("fallback served: {reason}");
    }

    if args.compact {
        println!("{}", payload.to_json()?);
    } else {
        println!("{}", payload.to_json_pretty()?);
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut config = EngineConfig::new(&args.zone)?.with_display_date_format(&args.display_format);
    if !args.date_formats.is_empty() {
        config = config.with_date_formats(&args.date_formats)?;
    }
    if let Some(minutes) = args.open_window_minutes {
        config = config.with_open_window_minutes(minutes)?;
    }
    Ok(config)
}

fn reference_now(text: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match text {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("--now is not an RFC 3339 timestamp: {text}")),
        None => Ok(Utc::now().fixed_offset()),
    }
}

/// Pick a fetcher for `source`. Local read failures become an unavailable
/// source so they produce the fallback payload like any other fetch failure.
fn load_source(source: &str) -> Box<dyn SourceFetcher> {
    if source == "-" {
        let mut buf = String::new();
        return match io::stdin().read_to_string(&mut buf) {
            Ok(_) => Box::new(StaticSource::new(buf, "stdin")),
            Err(e) => Box::new(UnavailableSource::new(format!("stdin: {e}"))),
        };
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        return Box::new(HttpSource::new(source));
    }

    let path = Path::new(source);
    if !path.exists() {
        return Box::new(UnavailableSource::new(format!("file not found: {source}")));
    }
    match fs::read_to_string(path) {
        Ok(content) => Box::new(StaticSource::new(content, source)),
        Err(e) => Box::new(UnavailableSource::new(format!("{source}: {e}"))),
    }
}
