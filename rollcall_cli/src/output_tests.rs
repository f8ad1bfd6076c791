use super::*;
use rollcall_lib::{
    aggregate_participants, IdentityResolver, ParticipationRecord, Phase, RosterMember,
};

fn participants() -> Vec<ParticipantAttendance> {
    let records: Vec<ParticipationRecord> = serde_json::from_value(serde_json::json!([
        {
            "name": "Mario Rossi",
            "userEmail": "mario@example.org",
            "joinTime": 0,
            "leaveTime": 100
        },
        {
            "name": "Mario (tablet)",
            "userEmail": "mario@example.org",
            "joinTime": 50,
            "leaveTime": 150
        },
        { "name": "=HYPERLINK(\"x\")", "joinTime": 0, "leaveTime": "garbage" }
    ]))
    .unwrap();
    aggregate_participants(&records, SessionWindow::new(0, 200))
}

fn suggestions() -> (Vec<UnassignedRecord>, BTreeMap<RecordID, MatchResult>) {
    let records = vec![
        UnassignedRecord::new(1, "Rossi Mario"),
        UnassignedRecord::new(2, "Nobody Here"),
    ];
    let mut map = BTreeMap::new();
    map.insert(
        1,
        MatchResult::new(RosterMember::new(7, "Mario", "Rossi", ""), Phase::ExactName),
    );
    (records, map)
}

fn csv_from_rows<T: Serialize>(rows: &[T]) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

// -- OutputFormat --

#[test]
fn test_output_format_names() {
    assert_eq!(OutputFormat::from_name("json"), OutputFormat::Json);
    assert_eq!(OutputFormat::from_name("csv"), OutputFormat::Csv);
    assert_eq!(OutputFormat::from_name("markdown"), OutputFormat::Markdown);
    assert_eq!(OutputFormat::from_name("md"), OutputFormat::Markdown);
    assert_eq!(OutputFormat::from_name("anything"), OutputFormat::Table);
}

// -- format helpers --

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(0), "0:00:00");
    assert_eq!(format_duration(5400), "1:30:00");
    assert_eq!(format_duration(3725), "1:02:05");
    assert_eq!(format_duration(-10), "0:00:00");
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(1_740_819_600), "2025-03-01 09:00:00 UTC");
}

#[test]
fn test_sanitize_csv_field_equals() {
    assert_eq!(sanitize_csv_field("=SUM(A1)"), "\t=SUM(A1)");
}

#[test]
fn test_sanitize_csv_field_plus() {
    assert_eq!(sanitize_csv_field("+1234"), "\t+1234");
}

#[test]
fn test_sanitize_csv_field_minus() {
    assert_eq!(
        sanitize_csv_field("-cmd|'/C calc'!A0"),
        "\t-cmd|'/C calc'!A0"
    );
}

#[test]
fn test_sanitize_csv_field_at() {
    assert_eq!(sanitize_csv_field("@SUM(A1:A2)"), "\t@SUM(A1:A2)");
}

#[test]
fn test_sanitize_csv_field_normal() {
    assert_eq!(sanitize_csv_field("Mario Rossi"), "Mario Rossi");
}

#[test]
fn test_sanitize_csv_field_empty() {
    assert_eq!(sanitize_csv_field(""), "");
}

// -- Duration rows --

#[test]
fn test_build_duration_rows() {
    let rows = build_duration_rows(&participants(), SessionWindow::new(0, 200), 75);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].participant, "mario@example.org");
    assert_eq!(rows[0].name, "Mario Rossi");
    assert_eq!(rows[0].intervals, 2);
    assert_eq!(rows[0].seconds, 150);
    assert_eq!(rows[0].attended, "0:02:30");
    assert_eq!(rows[0].percent, "75%");
    assert_eq!(rows[0].completed, "yes");
    assert_eq!(rows[1].dropped, 1);
    assert_eq!(rows[1].completed, "no");
}

#[test]
fn test_csv_duration_headers() {
    let rows = build_duration_rows(&participants(), SessionWindow::new(0, 200), 75);
    let csv = csv_from_rows(&rows);
    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "Participant,Name,Intervals,Dropped,Attended,Seconds,Percent,Completed"
    );
}

#[test]
fn test_csv_duration_rows_neutralize_formulas() {
    let rows: Vec<DurationRow> =
        build_duration_rows(&participants(), SessionWindow::new(0, 200), 75)
            .into_iter()
            .map(DurationRow::csv_safe)
            .collect();
    assert!(rows[1].name.starts_with('\t'));
    assert_eq!(rows[0].name, "Mario Rossi");
}

// -- Suggestion rows --

#[test]
fn test_build_suggestion_rows_matched_only() {
    let (records, map) = suggestions();
    let rows = build_suggestion_rows(&records, &map, false);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].record, 1);
    assert_eq!(rows[0].member_id, "7");
    assert_eq!(rows[0].member, "Mario Rossi");
    assert_eq!(rows[0].phase, "1");
    assert_eq!(rows[0].confidence, "0.95");
    assert_eq!(rows[0].match_type, "name");
}

#[test]
fn test_build_suggestion_rows_include_unmatched() {
    let (records, map) = suggestions();
    let rows = build_suggestion_rows(&records, &map, true);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].identifier, "Nobody Here");
    assert_eq!(rows[1].member, "");
}

#[test]
fn test_csv_suggestion_headers() {
    let (records, map) = suggestions();
    let csv = csv_from_rows(&build_suggestion_rows(&records, &map, true));
    let header = csv.lines().next().unwrap();
    assert_eq!(header, "Record,Identifier,Member ID,Member,Phase,Confidence,Type");
}

#[test]
fn test_json_suggestion_report_omits_absent_fields() {
    let (records, map) = suggestions();
    let reports: Vec<SuggestionReport> = records
        .iter()
        .map(|r| SuggestionReport {
            record_id: r.id,
            identifier: &r.name,
            suggestion: map.get(&r.id),
        })
        .collect();
    let val = serde_json::to_value(&reports).unwrap();
    assert_eq!(val[0]["recordId"], 1);
    assert_eq!(val[0]["phase"], 1);
    assert_eq!(val[0]["matchType"], "name");
    assert_eq!(val[0]["member"]["id"], 7);
    assert!(val[1].get("member").is_none());
    assert!(val[1].get("phase").is_none());
}

#[test]
fn test_json_participant_report_flattens() {
    let participants = participants();
    let report = ParticipantReport {
        attendance: &participants[0],
        percentage: 75,
        completion_met: true,
    };
    let val = serde_json::to_value(&report).unwrap();
    assert_eq!(val["total_seconds"], 150);
    assert_eq!(val["key"]["kind"], "email");
    assert_eq!(val["completion_met"], true);
}

// -- Explain rows --

#[test]
fn test_build_phase_rows_marks_winner() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(7, "Mario", "Rossi", "")]);
    let rows = build_phase_rows(&resolver.explain("Rossi Mario"));
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].phase, 1);
    assert_eq!(rows[0].candidate, "Mario Rossi (7)");
    assert_eq!(rows[0].selected, "*");
    assert!(rows[1..].iter().all(|r| r.selected.is_empty()));
    assert_eq!(rows[1].candidate, "-");
}

#[test]
fn test_csv_phase_rows_neutralize_formulas() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(7, "=cmd", "Rossi", "")]);
    let rows: Vec<PhaseRow> = build_phase_rows(&resolver.explain("=cmd Rossi"))
        .into_iter()
        .map(PhaseRow::csv_safe)
        .collect();
    assert_eq!(rows[0].candidate, "\t=cmd Rossi (7)");
    assert_eq!(rows[1].candidate, "-");
}

#[test]
fn test_build_variant_rows() {
    let filter = rollcall_lib::NoiseFilter::default();
    let variants = rollcall_lib::name_parser::parse_free_text_name("Mario Rossi", &filter);
    let rows = build_variant_rows(&variants);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source, "first_last");
}

#[test]
fn test_build_pattern_rows_only_matches() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(7, "Mario", "Rossi", "")]);
    let analysis = rollcall_lib::EmailPatternMatcher::new(resolver.roster())
        .analyze("mario.rossi@example.org")
        .unwrap();
    let rows = build_pattern_rows(&analysis);
    // three separator spellings, reached through both the original and inverted variant
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].pattern, "first_last");
    assert_eq!(rows[0].value, "mariorossi");
    assert_eq!(rows[1].pattern, "first_dot_last");
    assert_eq!(rows[2].value, "mario_rossi");
    assert_eq!(rows[3].pattern, "last_first");
}

// -- Markdown output --

#[test]
fn test_markdown_suggestions_structure() {
    let (records, map) = suggestions();
    let mut table = Table::new(build_suggestion_rows(&records, &map, true));
    table.with(Style::markdown());
    let md = table.to_string();
    assert!(md.contains('|'));
    assert!(md.contains("---"));
    assert!(md.contains("Identifier"));
    assert!(md.contains("Confidence"));
}
