use std::collections::BTreeMap;

use anyhow::Result;
use chrono::DateTime;
use rollcall_lib::email_matcher::EmailAnalysis;
use rollcall_lib::{
    evaluate_completion, Explanation, MatchResult, NameVariant, ParticipantAttendance, RecordID,
    SessionWindow, UnassignedRecord,
};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a plain table.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct DurationRow {
    #[tabled(rename = "Participant")]
    #[serde(rename = "Participant")]
    participant: String,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Intervals")]
    #[serde(rename = "Intervals")]
    intervals: usize,
    #[tabled(rename = "Dropped")]
    #[serde(rename = "Dropped")]
    dropped: usize,
    #[tabled(rename = "Attended")]
    #[serde(rename = "Attended")]
    attended: String,
    #[tabled(rename = "Seconds")]
    #[serde(rename = "Seconds")]
    seconds: i64,
    #[tabled(rename = "Percent")]
    #[serde(rename = "Percent")]
    percent: String,
    #[tabled(rename = "Completed")]
    #[serde(rename = "Completed")]
    completed: String,
}

#[derive(Tabled, Serialize)]
pub struct SuggestionRow {
    #[tabled(rename = "Record")]
    #[serde(rename = "Record")]
    record: RecordID,
    #[tabled(rename = "Identifier")]
    #[serde(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Member ID")]
    #[serde(rename = "Member ID")]
    member_id: String,
    #[tabled(rename = "Member")]
    #[serde(rename = "Member")]
    member: String,
    #[tabled(rename = "Phase")]
    #[serde(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Confidence")]
    #[serde(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    match_type: String,
}

#[derive(Tabled, Serialize)]
pub struct PhaseRow {
    #[tabled(rename = "Phase")]
    #[serde(rename = "Phase")]
    phase: u8,
    #[tabled(rename = "Strategy")]
    #[serde(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Candidate")]
    #[serde(rename = "Candidate")]
    candidate: String,
    #[tabled(rename = "Selected")]
    #[serde(rename = "Selected")]
    selected: String,
}

#[derive(Tabled, Serialize)]
pub struct VariantRow {
    #[tabled(rename = "Firstname")]
    #[serde(rename = "Firstname")]
    firstname: String,
    #[tabled(rename = "Lastname")]
    #[serde(rename = "Lastname")]
    lastname: String,
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    source: String,
}

#[derive(Tabled, Serialize)]
pub struct PatternRow {
    #[tabled(rename = "Member")]
    #[serde(rename = "Member")]
    member: String,
    #[tabled(rename = "Pattern")]
    #[serde(rename = "Pattern")]
    pattern: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

/// JSON shape of one participant in `durations`.
#[derive(Serialize)]
pub struct ParticipantReport<'a> {
    #[serde(flatten)]
    pub attendance: &'a ParticipantAttendance,
    pub percentage: u32,
    pub completion_met: bool,
}

/// JSON shape of one record in `suggest`: the suggestion fields are absent
/// when nothing was suggested.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionReport<'a> {
    pub record_id: RecordID,
    pub identifier: &'a str,
    #[serde(flatten)]
    pub suggestion: Option<&'a MatchResult>,
}

// -- Row builders --

pub fn build_duration_rows(
    participants: &[ParticipantAttendance],
    window: SessionWindow,
    required_percent: u32,
) -> Vec<DurationRow> {
    participants
        .iter()
        .map(|p| {
            let status = evaluate_completion(p.total_seconds, window, required_percent);
            DurationRow {
                participant: p.key.to_string(),
                name: p.display_name.clone(),
                intervals: p.interval_count,
                dropped: p.dropped_intervals,
                attended: format_duration(p.total_seconds),
                seconds: p.total_seconds,
                percent: format!("{}%", status.percentage),
                completed: if status.completion_met { "yes" } else { "no" }.to_string(),
            }
        })
        .collect()
}

pub fn build_suggestion_rows(
    records: &[UnassignedRecord],
    suggestions: &BTreeMap<RecordID, MatchResult>,
    include_unmatched: bool,
) -> Vec<SuggestionRow> {
    records
        .iter()
        .filter_map(|r| match suggestions.get(&r.id) {
            Some(m) => Some(SuggestionRow {
                record: r.id,
                identifier: r.name.clone(),
                member_id: m.member.id.to_string(),
                member: m.member.full_name(),
                phase: m.phase.to_string(),
                confidence: format!("{:.2}", m.confidence),
                match_type: m.match_type.to_string(),
            }),
            None if include_unmatched => Some(SuggestionRow {
                record: r.id,
                identifier: r.name.clone(),
                member_id: String::new(),
                member: String::new(),
                phase: String::new(),
                confidence: String::new(),
                match_type: String::new(),
            }),
            None => None,
        })
        .collect()
}

pub fn build_phase_rows(explanation: &Explanation) -> Vec<PhaseRow> {
    let winner = explanation.winner.as_ref().map(|w| w.phase);
    explanation
        .outcomes
        .iter()
        .map(|o| PhaseRow {
            phase: o.phase.number(),
            strategy: o.strategy.to_string(),
            candidate: o
                .member
                .as_ref()
                .map(|m| format!("{} ({})", m.full_name(), m.id))
                .unwrap_or_else(|| "-".to_string()),
            selected: if winner == Some(o.phase) { "*" } else { "" }.to_string(),
        })
        .collect()
}

pub fn build_variant_rows(variants: &[NameVariant]) -> Vec<VariantRow> {
    variants
        .iter()
        .map(|v| VariantRow {
            firstname: v.firstname.clone(),
            lastname: v.lastname.clone(),
            source: v.source.to_string(),
        })
        .collect()
}

/// Only the patterns that matched; the full list is in the JSON output.
pub fn build_pattern_rows(analysis: &EmailAnalysis) -> Vec<PatternRow> {
    analysis
        .exact_patterns_tested
        .iter()
        .filter(|c| c.matches)
        .map(|c| PatternRow {
            member: format!("{} ({})", c.member, c.member_id),
            pattern: serde_json::to_value(c.pattern)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            value: c.value.clone(),
        })
        .collect()
}

// -- Table / Markdown / CSV output --

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    println!("{}", Table::new(rows));
}

pub fn print_markdown<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<T: Serialize>(rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Print rows in a tabular format. JSON is handled by the caller.
pub fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Markdown => print_markdown(rows),
        OutputFormat::Csv => print_csv(&rows)?,
        OutputFormat::Table | OutputFormat::Json => print_table(rows),
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

// -- Formatting helpers --

/// Neutralize spreadsheet formula prefixes in user-controlled CSV cells.
pub fn sanitize_csv_field(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("\t{}", value),
        _ => value.to_string(),
    }
}

impl SuggestionRow {
    pub fn csv_safe(self) -> Self {
        Self {
            identifier: sanitize_csv_field(&self.identifier),
            member: sanitize_csv_field(&self.member),
            ..self
        }
    }
}

impl PhaseRow {
    pub fn csv_safe(self) -> Self {
        Self {
            candidate: sanitize_csv_field(&self.candidate),
            ..self
        }
    }
}

impl DurationRow {
    pub fn csv_safe(self) -> Self {
        Self {
            participant: sanitize_csv_field(&self.participant),
            name: sanitize_csv_field(&self.name),
            ..self
        }
    }
}

/// `H:MM:SS`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// `YYYY-MM-DD HH:MM:SS UTC`, or the raw number when out of range.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_seconds.to_string())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
