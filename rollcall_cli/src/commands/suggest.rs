//! The `suggest` subcommand: roster suggestions for unassigned records.

use anyhow::{Context, Result};
use clap::Args;
use rollcall_lib::roster::deduplicate;
use rollcall_lib::validation::sanitize_identifier;
use rollcall_lib::{
    load_document, sort_records_by_suggestion_type, EngineConfig, RosterMember, SuggestionEngine,
    SuggestionStats, UnassignedRecord,
};
use std::path::PathBuf;

use crate::output::{
    build_suggestion_rows, print_json, print_rows, OutputFormat, SuggestionReport, SuggestionRow,
};

/// Arguments for the `suggest` subcommand.
#[derive(Args)]
pub struct SuggestArgs {
    /// Roster of known members (JSON or YAML)
    #[arg(long)]
    pub roster: PathBuf,

    /// Unassigned records to resolve (JSON or YAML)
    #[arg(long)]
    pub records: PathBuf,

    /// Drop repeated roster entries and words duplicated across name fields
    #[arg(long)]
    pub dedup_roster: bool,

    /// Also list records with no suggestion
    #[arg(long)]
    pub include_unmatched: bool,
}

/// Sanitized copy of a record. Identifiers that sanitize to nothing are blanked
/// so they resolve to no suggestion.
fn clean_record(record: &UnassignedRecord) -> UnassignedRecord {
    match sanitize_identifier(&record.name) {
        Ok(name) => UnassignedRecord::new(record.id, &name),
        Err(e) => {
            tracing::warn!("Record {}: {}", record.id, e);
            UnassignedRecord::new(record.id, "")
        }
    }
}

pub fn run(args: &SuggestArgs, config: &EngineConfig, format: &OutputFormat) -> Result<()> {
    let mut roster: Vec<RosterMember> = load_document(&args.roster)
        .with_context(|| format!("Failed to load roster from {}", args.roster.display()))?;
    if args.dedup_roster {
        let before = roster.len();
        roster = deduplicate(&roster);
        eprintln!("Roster deduplicated: {} -> {} members", before, roster.len());
    }

    let records: Vec<UnassignedRecord> = load_document(&args.records)
        .with_context(|| format!("Failed to load records from {}", args.records.display()))?;
    let records: Vec<UnassignedRecord> = records.iter().map(clean_record).collect();

    let filter = config.noise_filter()?;
    let mut engine = SuggestionEngine::with_noise_filter(roster, filter);
    let suggestions = engine.generate_suggestions(&records);
    let sorted = sort_records_by_suggestion_type(&records, &suggestions);

    let stats = SuggestionStats::from_suggestions(&suggestions);
    eprintln!(
        "{} records, {} suggestions ({} name, {} email; {} high confidence, {} medium)",
        records.len(),
        stats.total,
        stats.name_based,
        stats.email_based,
        stats.high_confidence,
        stats.medium_confidence
    );
    for (phase, count) in &engine.resolver_statistics().phase_breakdown {
        eprintln!("  phase {}: {}", phase, count);
    }

    match format {
        OutputFormat::Json => {
            let reports: Vec<SuggestionReport> = sorted
                .iter()
                .filter(|r| args.include_unmatched || suggestions.contains_key(&r.id))
                .map(|r| SuggestionReport {
                    record_id: r.id,
                    identifier: &r.name,
                    suggestion: suggestions.get(&r.id),
                })
                .collect();
            print_json(&reports);
        }
        OutputFormat::Csv => {
            let rows: Vec<SuggestionRow> =
                build_suggestion_rows(&sorted, &suggestions, args.include_unmatched)
                    .into_iter()
                    .map(SuggestionRow::csv_safe)
                    .collect();
            print_rows(rows, format)?;
        }
        _ => print_rows(
            build_suggestion_rows(&sorted, &suggestions, args.include_unmatched),
            format,
        )?,
    }

    Ok(())
}
