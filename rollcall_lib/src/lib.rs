//! Attendance reconciliation engine: interval consolidation and multi-phase
//! identity resolution.
//!
//! Consumes the boundary types of the `rollcall_feed` crate. Everything here is
//! synchronous and free of I/O apart from the config loader.

pub mod accent;
pub mod attendance;
pub mod cache;
pub mod config;
pub mod display_matcher;
pub mod email_matcher;
pub mod error;
pub mod interval;
pub mod name_parser;
pub mod phases;
pub mod resolver;
pub mod roster;
pub mod suggestion;
pub mod validation;

pub use rollcall_feed;
pub use rollcall_feed::timestamp;
pub use rollcall_feed::types;
pub use rollcall_feed::types::{
    MemberID, ParticipationFeed, ParticipationRecord, RecordID, RosterMember, SessionConfig,
    UnassignedRecord,
};
pub use rollcall_feed::{load_document, DocumentFormat};

pub use attendance::{
    aggregate_participants, evaluate_completion, participant_key, CompletionStatus,
    ParticipantAttendance, ParticipantKey, SessionWindow,
};
pub use config::{load_config, ConfigError, EngineConfig};
pub use email_matcher::{is_email, EmailAnalysis, EmailPatternMatcher};
pub use error::RollcallError;
pub use interval::{clip_and_sum, merge, total_for_range, TimeInterval};
pub use name_parser::{NameVariant, NoiseFilter, NoiseFilterError, NoiseLists, VariantSource};
pub use resolver::{
    Explanation, IdentityResolver, MatchPhase, MatchResult, MatchType, Phase, PhaseContext,
    ResolverStats,
};
pub use roster::RosterIndex;
pub use suggestion::{sort_records_by_suggestion_type, SuggestionEngine, SuggestionStats};
