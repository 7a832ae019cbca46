//! Typo-tolerant suggestions against the static command tables.

use std::cmp::Ordering;

use crate::command::domain::{Domain, similarity};

/// Internal commands offered when a `/` command is misspelt.
pub const SYSTEM_COMMANDS: [&str; 7] = [
    "help", "help:at", "model", "models", "debug", "clear", "history",
];

const SIMILARITY_THRESHOLD: f64 = 0.6;
const MAX_SUGGESTIONS: usize = 3;

struct Candidate {
    address_score: f64,
    command_score: f64,
    syntax: String,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        other
            .address_score
            .total_cmp(&self.address_score)
            .then_with(|| other.command_score.total_cmp(&self.command_score))
    }
}

/// Suggests up to three commands close to the given text.
///
/// For `@domain:command` text both segments must score above `0.6`
/// similarity against the domain table and that domain's common commands.
/// For `/command` text the internal command list is searched. Other text
/// yields no suggestions.
#[must_use]
pub fn suggest_similar_commands(text: &str) -> Vec<String> {
    let head = text.split_whitespace().next().unwrap_or_default();

    let mut candidates = if let Some(rest) = head.strip_prefix('@') {
        domain_candidates(rest)
    } else if let Some(rest) = head.strip_prefix('/') {
        system_candidates(rest)
    } else {
        Vec::new()
    };

    candidates.sort_by(Candidate::rank);
    candidates
        .into_iter()
        .map(|candidate| candidate.syntax)
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn domain_candidates(address: &str) -> Vec<Candidate> {
    let (raw_domain, raw_command) = address.split_once(':').unwrap_or((address, ""));
    let domain_part = raw_domain.to_ascii_lowercase();
    let command_part = raw_command
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let mut candidates = Vec::new();
    for domain in Domain::ALL {
        let address_score = similarity(&domain_part, domain.as_str());
        if address_score <= SIMILARITY_THRESHOLD {
            continue;
        }
        for command in domain.common_commands() {
            let command_score = if command_part.is_empty() {
                1.0
            } else {
                similarity(&command_part, command)
            };
            if command_score > SIMILARITY_THRESHOLD {
                candidates.push(Candidate {
                    address_score,
                    command_score,
                    syntax: format!("@{domain}:{command}"),
                });
            }
        }
    }
    candidates
}

fn system_candidates(command: &str) -> Vec<Candidate> {
    let normalized = command.to_ascii_lowercase();
    SYSTEM_COMMANDS
        .iter()
        .filter_map(|candidate| {
            let command_score = similarity(&normalized, candidate);
            (command_score > SIMILARITY_THRESHOLD).then(|| Candidate {
                address_score: 1.0,
                command_score,
                syntax: format!("/{candidate}"),
            })
        })
        .collect()
}
