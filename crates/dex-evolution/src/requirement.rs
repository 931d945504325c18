// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Human-readable requirement text for one evolution edge.
//!
//! Clause order is fixed: level, item, friendship, affection, known move,
//! location, time of day, weather, beauty, gender, relative physical stats,
//! trade. Output is a pure function of its input.

use crate::model::{EvolutionConditions, Gender, RelativePhysicalStats};

/// Clause used when an edge stores no condition.
pub const DEFAULT_CLAUSE: &str = "High friendship";
/// Default clause separator.
pub const DEFAULT_SEPARATOR: &str = ", ";

const LEVEL_UP_TRIGGER: &str = "level-up";

/// Turn an upstream slug (`water-stone`) into display text (`Water Stone`).
pub fn humanize(slug: &str) -> String {
    slug.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn time_clause(time: &str) -> String {
    match time {
        "day" => "During the day".to_owned(),
        "night" => "At night".to_owned(),
        other => format!("During {}", humanize(other).to_lowercase()),
    }
}

/// One clause per populated condition, in priority order.
///
/// Never empty: an edge without conditions yields the humanised trigger when
/// it is something other than `level-up`, else [`DEFAULT_CLAUSE`].
pub fn requirement_clauses(conditions: &EvolutionConditions, trigger: Option<&str>) -> Vec<String> {
    let mut clauses = Vec::new();

    if let Some(level) = conditions.min_level {
        clauses.push(format!("Level {level}"));
    }
    if let Some(item) = conditions.item_name.as_deref() {
        let verb = if conditions.is_trade { "Holding" } else { "Use" };
        clauses.push(format!("{verb} {}", humanize(item)));
    }
    if let Some(happiness) = conditions.min_happiness {
        clauses.push(format!("Friendship {happiness}+"));
    }
    if let Some(affection) = conditions.min_affection {
        clauses.push(format!("Affection {affection}+"));
    }
    if let Some(known_move) = conditions.known_move_name.as_deref() {
        clauses.push(format!("Knows {}", humanize(known_move)));
    }
    if let Some(location) = conditions.location_name.as_deref() {
        clauses.push(format!("At {}", humanize(location)));
    }
    if let Some(time) = conditions.time_of_day() {
        clauses.push(time_clause(time));
    }
    if conditions.needs_rain {
        clauses.push("While raining".to_owned());
    }
    if let Some(beauty) = conditions.min_beauty {
        clauses.push(format!("Beauty {beauty}+"));
    }
    if let Some(gender) = conditions.gender {
        clauses.push(
            match gender {
                Gender::Female => "Female only",
                Gender::Male => "Male only",
            }
            .to_owned(),
        );
    }
    if let Some(stats) = conditions.relative_physical_stats {
        clauses.push(
            match stats {
                RelativePhysicalStats::AttackHigher => "Attack > Defense",
                RelativePhysicalStats::Equal => "Attack = Defense",
                RelativePhysicalStats::AttackLower => "Attack < Defense",
            }
            .to_owned(),
        );
    }
    if conditions.is_trade {
        clauses.push("Trade".to_owned());
    }

    if clauses.is_empty() {
        let fallback = trigger
            .filter(|t| t.trim() != LEVEL_UP_TRIGGER)
            .map(humanize)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CLAUSE.to_owned());
        clauses.push(fallback);
    }
    clauses
}

/// Join [`requirement_clauses`] with `separator`.
pub fn format_requirements(
    conditions: &EvolutionConditions,
    trigger: Option<&str>,
    separator: &str,
) -> String {
    requirement_clauses(conditions, trigger).join(separator)
}
