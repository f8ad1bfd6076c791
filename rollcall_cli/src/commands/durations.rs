//! The `durations` subcommand: consolidated attendance per participant.

use anyhow::{bail, Context, Result};
use clap::Args;
use rollcall_lib::timestamp::parse_timestamp;
use rollcall_lib::validation::{validate_required_percent, validate_window};
use rollcall_lib::{
    aggregate_participants, evaluate_completion, load_document, EngineConfig, ParticipationFeed,
    SessionConfig,
};
use std::path::PathBuf;

use crate::output::{
    build_duration_rows, format_timestamp, print_json, print_rows, DurationRow, OutputFormat,
    ParticipantReport,
};

/// Arguments for the `durations` subcommand.
///
/// The session window comes from, in increasing precedence: the config file,
/// a `--session` document, and the `--window-start` / `--window-end` flags.
#[derive(Args)]
pub struct DurationsArgs {
    /// Participation feed (JSON or YAML)
    #[arg(long)]
    pub feed: PathBuf,

    /// Session configuration document (JSON or YAML)
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Window start: epoch seconds or RFC 3339
    #[arg(long)]
    pub window_start: Option<String>,

    /// Window end: epoch seconds or RFC 3339
    #[arg(long)]
    pub window_end: Option<String>,

    /// Required attendance percentage (0-100)
    #[arg(long)]
    pub required_percent: Option<i64>,
}

fn parse_flag(value: &str, flag: &str) -> Result<i64> {
    match parse_timestamp(value) {
        Some(t) => Ok(t),
        None => bail!(
            "Invalid {} value: '{}'. Use epoch seconds or RFC 3339 (e.g. 2025-03-01T09:00:00Z)",
            flag,
            value
        ),
    }
}

pub fn run(args: &DurationsArgs, config: &EngineConfig, format: &OutputFormat) -> Result<()> {
    let session: Option<SessionConfig> = match args.session {
        Some(ref path) => Some(
            load_document(path)
                .with_context(|| format!("Failed to load session from {}", path.display()))?,
        ),
        None => None,
    };

    let mut start = config.session.window_start()?;
    let mut end = config.session.window_end()?;
    let mut required = config.session.required_attendance_percent.map(i64::from);

    if let Some(s) = session {
        start = Some(s.window_start);
        end = Some(s.window_end);
        required = Some(i64::from(s.required_attendance_percent));
    }
    if let Some(ref v) = args.window_start {
        start = Some(parse_flag(v, "--window-start")?);
    }
    if let Some(ref v) = args.window_end {
        end = Some(parse_flag(v, "--window-end")?);
    }
    if let Some(p) = args.required_percent {
        required = Some(p);
    }

    let (Some(start), Some(end)) = (start, end) else {
        bail!(
            "No session window: pass --window-start/--window-end, --session, \
             or set [session] in the config file"
        );
    };
    let window = validate_window(start, end)?;
    let required = validate_required_percent(required.unwrap_or(0))?;

    let feed: ParticipationFeed = load_document(&args.feed)
        .with_context(|| format!("Failed to load feed from {}", args.feed.display()))?;
    let records = feed.into_records();
    let participants = aggregate_participants(&records, window);

    let met = participants
        .iter()
        .filter(|p| evaluate_completion(p.total_seconds, window, required).completion_met)
        .count();
    eprintln!(
        "Window {} - {} ({}s), {} records, {} participants, {} at or above {}%",
        format_timestamp(window.start),
        format_timestamp(window.end),
        window.length(),
        records.len(),
        participants.len(),
        met,
        required
    );

    match format {
        OutputFormat::Json => {
            let reports: Vec<ParticipantReport> = participants
                .iter()
                .map(|p| {
                    let status = evaluate_completion(p.total_seconds, window, required);
                    ParticipantReport {
                        attendance: p,
                        percentage: status.percentage,
                        completion_met: status.completion_met,
                    }
                })
                .collect();
            print_json(&reports);
        }
        OutputFormat::Csv => {
            let rows: Vec<DurationRow> = build_duration_rows(&participants, window, required)
                .into_iter()
                .map(DurationRow::csv_safe)
                .collect();
            print_rows(rows, format)?;
        }
        _ => print_rows(build_duration_rows(&participants, window, required), format)?,
    }

    Ok(())
}
