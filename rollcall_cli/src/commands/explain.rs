//! The `explain` subcommand: show how each phase treats one identifier.

use anyhow::{Context, Result};
use clap::Args;
use rollcall_lib::name_parser::{identifier_parsing_stats, ParsingStats};
use rollcall_lib::validation::sanitize_identifier;
use rollcall_lib::{
    is_email, load_document, EmailAnalysis, EmailPatternMatcher, EngineConfig, Explanation,
    IdentityResolver, RosterMember,
};
use serde::Serialize;
use std::path::PathBuf;

use crate::output::{
    build_pattern_rows, build_phase_rows, build_variant_rows, print_json, print_rows,
    OutputFormat, PhaseRow,
};

/// Arguments for the `explain` subcommand.
#[derive(Args)]
pub struct ExplainArgs {
    /// Display name or email to explain
    pub identifier: String,

    /// Roster of known members (JSON or YAML)
    #[arg(long)]
    pub roster: PathBuf,
}

#[derive(Serialize)]
struct ExplainReport {
    parsing: ParsingStats,
    #[serde(flatten)]
    explanation: Explanation,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<EmailAnalysis>,
}

pub fn run(args: &ExplainArgs, config: &EngineConfig, format: &OutputFormat) -> Result<()> {
    let identifier = sanitize_identifier(&args.identifier)?;
    let roster: Vec<RosterMember> = load_document(&args.roster)
        .with_context(|| format!("Failed to load roster from {}", args.roster.display()))?;

    let resolver = IdentityResolver::with_noise_filter(roster, config.noise_filter()?);
    let parsing = identifier_parsing_stats(&identifier, resolver.noise_filter());
    let explanation = resolver.explain(&identifier);
    let email = if is_email(&identifier) {
        EmailPatternMatcher::new(resolver.roster()).analyze(&identifier)
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            print_json(&ExplainReport {
                parsing,
                explanation,
                email,
            });
        }
        OutputFormat::Csv => {
            let rows: Vec<PhaseRow> = build_phase_rows(&explanation)
                .into_iter()
                .map(PhaseRow::csv_safe)
                .collect();
            print_rows(rows, format)?;
        }
        _ => {
            println!("Identifier: {}", explanation.identifier);
            println!();
            println!("Name variants ({}):", parsing.total_variations);
            if parsing.variations.is_empty() {
                println!("  none");
            } else {
                print_rows(build_variant_rows(&parsing.variations), format)?;
            }

            println!();
            println!("Phases:");
            print_rows(build_phase_rows(&explanation), format)?;

            if let Some(ref analysis) = email {
                let rows = build_pattern_rows(analysis);
                println!();
                println!(
                    "Email local part '{}' ({} exact patterns matched):",
                    analysis.local_part,
                    rows.len()
                );
                if !rows.is_empty() {
                    print_rows(rows, format)?;
                }
            }

            println!();
            match explanation.winner {
                Some(ref m) => println!(
                    "Suggestion: {} ({}) via phase {} {}, confidence {:.2}",
                    m.member.full_name(),
                    m.member.id,
                    m.phase,
                    m.phase.label(),
                    m.confidence
                ),
                None => println!("Suggestion: none"),
            }
        }
    }

    Ok(())
}
