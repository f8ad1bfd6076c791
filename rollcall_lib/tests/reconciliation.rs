use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rollcall_lib::interval::{merge, total_for_range, TimeInterval};
use rollcall_lib::name_parser::{parse_roster_name, NameVariant, VariantSource};
use rollcall_lib::roster::deduplicate;
use rollcall_lib::{
    aggregate_participants, evaluate_completion, load_config, load_document, IdentityResolver,
    MatchPhase, MatchType, NoiseFilter, ParticipantKey, ParticipationFeed, Phase, PhaseContext,
    RosterMember, SessionConfig, SessionWindow, SuggestionEngine, SuggestionStats,
    UnassignedRecord,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(format!("tests/fixtures/{}", name))
}

fn roster() -> Vec<RosterMember> {
    load_document(&fixture_path("roster.json")).unwrap()
}

fn unassigned() -> Vec<UnassignedRecord> {
    load_document(&fixture_path("unassigned.json")).unwrap()
}

fn iv(start: i64, end: i64) -> TimeInterval {
    TimeInterval::new(start, end)
}

// -- Durations --

#[test]
fn feed_to_durations() {
    let feed: ParticipationFeed = load_document(&fixture_path("feed.json")).unwrap();
    let session: SessionConfig = load_document(&fixture_path("session.json")).unwrap();
    let window = SessionWindow::from(&session);
    assert_eq!(window.length(), 7200);

    let attendance = aggregate_participants(&feed.into_records(), window);
    let keys: Vec<&str> = attendance.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "anna.verdi@example.org",
            "mario.rossi@example.org",
            "dott. giulia bianchi - comune di lodi",
            "guest",
        ]
    );

    // two devices, 09:00-10:00 and 09:30-10:30
    let mario = &attendance[1];
    assert_eq!(mario.interval_count, 2);
    assert_eq!(mario.total_seconds, 5400);
    let status = evaluate_completion(
        mario.total_seconds,
        window,
        session.required_attendance_percent,
    );
    assert_eq!(status.percentage, 75);
    assert!(status.completion_met);

    // left after the window closed
    let anna = &attendance[0];
    assert_eq!(anna.total_seconds, 900);
    assert_eq!(evaluate_completion(anna.total_seconds, window, 75).percentage, 13);

    let giulia = &attendance[2];
    assert!(matches!(giulia.key, ParticipantKey::DisplayName(_)));
    assert_eq!(giulia.total_seconds, 2700);
    assert_eq!(evaluate_completion(giulia.total_seconds, window, 75).percentage, 38);

    let guest = &attendance[3];
    assert_eq!(guest.dropped_intervals, 1);
    assert_eq!(guest.total_seconds, 0);
}

#[test]
fn config_window_matches_session_document() {
    let config = load_config(&fixture_path("engine.toml")).unwrap();
    let session: SessionConfig = load_document(&fixture_path("session.json")).unwrap();
    assert_eq!(config.session.window().unwrap(), Some(SessionWindow::from(&session)));
    assert_eq!(config.session.required_attendance_percent, Some(40));
}

#[test]
fn merge_is_idempotent() {
    let inputs = vec![
        vec![],
        vec![iv(0, 100), iv(50, 150), iv(300, 400)],
        vec![iv(10, 20), iv(0, 5), iv(5, 10), iv(30, 30), iv(40, 35)],
        vec![iv(-100, 100), iv(-50, 0), iv(99, 101)],
    ];
    for x in inputs {
        let once = merge(&x);
        assert_eq!(merge(&once), once);
    }
}

#[test]
fn duration_never_exceeds_window() {
    let intervals = vec![iv(-1000, 5000), iv(0, 10), iv(20, 4000), iv(100, 50)];
    for (start, end) in [(0, 200), (-500, 500), (100, 101), (0, 100_000)] {
        assert!(total_for_range(&intervals, start, end) <= end - start);
    }
}

#[test]
fn overlapping_devices_not_double_counted() {
    assert_eq!(total_for_range(&[iv(0, 100), iv(50, 150)], 0, 200), 150);
}

#[test]
fn touching_intervals_merge() {
    assert_eq!(merge(&[iv(0, 50), iv(50, 100)]), vec![iv(0, 100)]);
}

#[test]
fn interval_outside_window_contributes_nothing() {
    assert_eq!(total_for_range(&[iv(300, 400)], 0, 200), 0);
}

#[test]
fn inverted_window_yields_zero() {
    assert_eq!(total_for_range(&[iv(0, 100)], 200, 0), 0);
}

// -- Identity resolution --

#[test]
fn ambiguous_initial_email_not_suggested() {
    let roster = vec![
        RosterMember::new(1, "Andrea", "Rossi", ""),
        RosterMember::new(2, "Alessia", "Rossi", ""),
    ];
    let resolver = IdentityResolver::new(roster);
    assert!(resolver.find_best_match("a.rossi@x.com").is_none());
}

#[test]
fn unique_initial_email_accepted() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(1, "Marco", "Bianchi", "")]);
    let m = resolver.find_best_match("m.bianchi@x.com").unwrap();
    assert_eq!(m.member.id, 1);
    assert_eq!(m.phase, Phase::EmailPattern);
    assert_eq!(m.match_type, MatchType::Email);
}

#[test]
fn full_name_email_composition_wins() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(1, "Mario", "Rossi", "")]);
    let m = resolver.find_best_match("rossimario@x.com").unwrap();
    assert_eq!(m.member.id, 1);
    assert_eq!(m.phase, Phase::EmailPattern);

    let analysis = rollcall_lib::EmailPatternMatcher::new(resolver.roster())
        .analyze("rossimario@x.com")
        .unwrap();
    let first_hit = analysis.exact_patterns_tested.iter().find(|c| c.matches).unwrap();
    assert_eq!(first_hit.value, "rossimario");
}

#[test]
fn accent_insensitive_at_phase_three() {
    let resolver = IdentityResolver::new(vec![RosterMember::new(1, "María", "García", "")]);
    let m = resolver.find_best_match("MARIA GARCIA").unwrap();
    assert_eq!(m.member.id, 1);
    assert_eq!(m.phase, Phase::AccentInsensitive);
    assert_eq!(m.confidence, 0.90);
}

#[test]
fn organization_phrase_never_resolves() {
    let roster = vec![
        RosterMember::new(1, "Milano", "Comune", ""),
        RosterMember::new(2, "Comune", "Milano", ""),
        RosterMember::new(3, "Marco", "Milano", ""),
        RosterMember::new(4, "Di", "Comune", ""),
    ];
    let resolver = IdentityResolver::new(roster);
    for identifier in [
        "Comune di Milano",
        "COMUNE DI MILANO",
        "Comune di Milano - Ufficio Tecnico",
    ] {
        assert!(resolver.find_best_match(identifier).is_none(), "{}", identifier);
        let explanation = resolver.explain(identifier);
        assert!(explanation.outcomes.iter().all(|o| o.member.is_none()));
        assert!(explanation.winner.is_none());
    }
}

#[test]
fn organization_phrase_blocked_for_surname_first_member() {
    // surname-first reading would put "Comune" in the surname slot
    let mut resolver = IdentityResolver::new(vec![RosterMember::new(1, "Di", "Comune", "")]);
    let records = vec![
        UnassignedRecord::new(1, "Comune di Milano"),
        UnassignedRecord::new(2, "Di Comune"),
    ];
    let suggestions = resolver.process_records(&records);
    assert!(!suggestions.contains_key(&1));
    assert_eq!(suggestions[&2].member.id, 1);
    assert_eq!(suggestions[&2].phase, Phase::ExactName);
}

#[test]
fn duplicated_surname_in_roster_parses() {
    let member = RosterMember::new(13, "Alberto Deimann", "Deimann", "");
    let variants = parse_roster_name(&member);
    assert!(variants.contains(&NameVariant::new(
        "Alberto",
        "Deimann",
        VariantSource::DuplicatedLastnameRemoved
    )));
}

struct CountingPhase {
    phase: Phase,
    answer: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl MatchPhase for CountingPhase {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn try_match(&self, _identifier: &str, _ctx: &PhaseContext<'_>) -> Option<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

#[test]
fn phase_one_short_circuits_later_phases() {
    let calls: Vec<Arc<AtomicUsize>> = (0..6).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let phases: Vec<Box<dyn MatchPhase>> = Phase::ALL
        .iter()
        .zip(&calls)
        .map(|(&phase, c)| {
            Box::new(CountingPhase {
                phase,
                answer: Some(0),
                calls: Arc::clone(c),
            }) as Box<dyn MatchPhase>
        })
        .collect();
    let mut resolver = IdentityResolver::with_phases(roster(), NoiseFilter::default(), phases);

    let records = vec![UnassignedRecord::new(1, "x"), UnassignedRecord::new(2, "y")];
    let suggestions = resolver.process_records(&records);
    assert!(suggestions.values().all(|m| m.phase == Phase::ExactName));
    assert_eq!(calls[0].load(Ordering::SeqCst), 2);
    assert!(calls[1..].iter().all(|c| c.load(Ordering::SeqCst) == 0));
}

// -- Suggestions --

#[test]
fn batch_suggestions_from_fixtures() {
    let mut engine = SuggestionEngine::new(roster());
    let suggestions = engine.generate_suggestions(&unassigned());

    let outcome = |id: i64| suggestions.get(&id).map(|m| (m.member.id, m.phase.number()));
    assert_eq!(outcome(1001), Some((11, 1)));
    assert_eq!(outcome(1002), Some((17, 2)));
    assert_eq!(outcome(1003), None);
    assert_eq!(outcome(1004), Some((14, 3)));
    assert_eq!(outcome(1005), None);
    assert_eq!(outcome(1006), Some((12, 4)));
    assert_eq!(outcome(1007), Some((13, 5)));
    assert_eq!(outcome(1008), None);

    let stats = SuggestionStats::from_suggestions(&suggestions);
    assert_eq!(
        stats,
        SuggestionStats {
            total: 5,
            name_based: 4,
            email_based: 1,
            high_confidence: 3,
            medium_confidence: 2,
        }
    );

    let resolver_stats = engine.resolver_statistics();
    assert_eq!(resolver_stats.total_processed, 8);
    assert_eq!(resolver_stats.matches_found, 5);
}

#[test]
fn deduplicated_roster_resolves_exactly() {
    let mut engine = SuggestionEngine::new(deduplicate(&roster()));
    let suggestions = engine.generate_suggestions(&unassigned());
    let deimann = &suggestions[&1007];
    assert_eq!(deimann.member.id, 13);
    assert_eq!(deimann.member.firstname, "Alberto");
    assert_eq!(deimann.phase, Phase::ExactName);
}

#[test]
fn batch_suggestions_are_idempotent() {
    let roster = roster();
    let records = unassigned();
    let mut engine = SuggestionEngine::new(roster.clone());
    let first = engine.generate_suggestions(&records);
    let second = engine.generate_suggestions(&records);
    assert_eq!(first, second);
    assert_eq!(engine.resolver().roster().members(), roster.as_slice());
    assert_eq!(records, unassigned());
}
