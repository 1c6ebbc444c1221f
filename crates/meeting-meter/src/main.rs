use anyhow::{Context, Result};
use clap::Parser;
use meeting_meter_core::prelude::*;
use meeting_meter_core::{parse_duration, DEFAULT_TICK_INTERVAL};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
use config::{load_config, MeterConfig};

/// Flags that are also accepted in their single-dash form, e.g. `-rate=100`.
const LEGACY_FLAGS: [&str; 3] = ["rate", "duration", "ticks"];

#[derive(Parser, Debug)]
#[clap(author = "Red", version, about)]
struct Args {
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Hourly rate of the whole meeting, e.g. 100 or 9.95. Omit or pass 0 to
    /// enter each participant's rate.
    #[arg(short = 'r', long = "rate")]
    rate: Option<f64>,

    /// Expected meeting length, e.g. 1h or 150m. Omit or pass 0 for an
    /// open-ended meeting that runs until you type Q.
    #[arg(short = 'd', long = "duration", value_parser = parse_duration)]
    duration: Option<Duration>,

    /// How often to redraw the running cost, e.g. 2s or 5m. Fixed-length
    /// meetings tick only when this is above one second.
    #[arg(short = 't', long = "ticks", value_parser = parse_duration)]
    ticks: Option<Duration>,

    /// Config file with default rate and tick interval.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Keep running until a fixed-length ticking meeting ends instead of
    /// exiting straight away.
    #[arg(long)]
    wait: bool,
}

fn normalize_legacy_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(rest) if !rest.starts_with('-') => {
                let name = rest.split('=').next().unwrap_or(rest);
                if LEGACY_FLAGS.contains(&name) {
                    format!("-{}", arg)
                } else {
                    arg
                }
            }
            _ => arg,
        })
        .collect()
}

fn build_config(args: &Args, file: &MeterConfig) -> Result<MeetingConfig> {
    let hourly_rate = args.rate.or(file.hourly_rate).unwrap_or(0.0);
    let meeting_duration = args.duration.unwrap_or(Duration::ZERO);
    let tick_interval = match (args.ticks, &file.tick_interval) {
        (Some(ticks), _) => ticks,
        (None, Some(text)) => parse_duration(text)
            .with_context(|| format!("Invalid tick_interval in config file: {}", text))?,
        (None, None) => DEFAULT_TICK_INTERVAL,
    };

    Ok(MeetingConfig::new(hourly_rate, meeting_duration, tick_interval)?)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_from(normalize_legacy_flags(std::env::args()));
    init_logging(args.verbose);

    let file_config = load_config(args.config.as_deref())?;
    let config = build_config(&args, &file_config)?;

    let mut meter = MeetingMeter::new(config);
    let input = BufReader::new(tokio::io::stdin());

    match meter.run(input, tokio::io::stdout()).await? {
        MeetingOutcome::Finished(_) => std::process::exit(0),
        MeetingOutcome::Detached(session) => {
            if args.wait {
                let mut output = session.wait().await?;
                output.write_all(b"\n").await?;
                output.flush().await?;
            }
            std::process::exit(0)
        }
        MeetingOutcome::Projected { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(normalize_legacy_flags(strings(args))).unwrap()
    }

    #[test]
    fn test_legacy_flags_are_rewritten() {
        let normalized = normalize_legacy_flags(strings(&[
            "meeting-meter",
            "-rate=100",
            "-duration",
            "1h",
            "-ticks=2s",
            "-v",
            "--wait",
        ]));

        assert_eq!(
            normalized,
            strings(&[
                "meeting-meter",
                "--rate=100",
                "--duration",
                "1h",
                "--ticks=2s",
                "-v",
                "--wait",
            ])
        );
    }

    #[test]
    fn test_parses_legacy_command_line() {
        let args = parse(&["meeting-meter", "-rate=9.95", "-duration=30m", "-ticks=2s"]);

        assert_eq!(args.rate, Some(9.95));
        assert_eq!(args.duration, Some(Duration::from_secs(30 * 60)));
        assert_eq!(args.ticks, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_rejects_malformed_duration() {
        let result =
            Args::try_parse_from(normalize_legacy_flags(strings(&["meeting-meter", "-duration=soon"])));
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_prompt_for_rate_and_run_open_ended() {
        let args = parse(&["meeting-meter"]);
        let config = build_config(&args, &MeterConfig::default()).unwrap();

        assert!(config.needs_rate());
        assert_eq!(config.mode(), MeetingMode::Interactive);
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn test_flags_override_config_file() {
        let args = parse(&["meeting-meter", "--rate", "200", "--ticks", "3s", "--duration", "1h"]);
        let file = MeterConfig {
            hourly_rate: Some(50.0),
            tick_interval: Some("10s".to_string()),
        };

        let config = build_config(&args, &file).unwrap();
        assert_eq!(config.hourly_rate(), 200.0);
        assert_eq!(config.tick_interval(), Duration::from_secs(3));
        assert_eq!(config.mode(), MeetingMode::Ticking);
    }

    #[test]
    fn test_config_file_fills_missing_flags() {
        let args = parse(&["meeting-meter", "--duration", "1h"]);
        let file = MeterConfig {
            hourly_rate: Some(50.0),
            tick_interval: Some("10s".to_string()),
        };

        let config = build_config(&args, &file).unwrap();
        assert_eq!(config.hourly_rate(), 50.0);
        assert_eq!(config.tick_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_zero_ticks() {
        let args = parse(&["meeting-meter", "--ticks", "0"]);
        assert!(build_config(&args, &MeterConfig::default()).is_err());
    }

    #[test]
    fn test_rejects_bad_config_tick_interval() {
        let args = parse(&["meeting-meter"]);
        let file = MeterConfig {
            hourly_rate: None,
            tick_interval: Some("often".to_string()),
        };

        let error = build_config(&args, &file).unwrap_err();
        assert!(error.to_string().contains("Invalid tick_interval"));
    }
}
