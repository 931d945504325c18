// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Read-only snapshots handed to the resolver by the storage collaborator.
//!
//! The relational source records, per species, only its chain membership and,
//! per evolution edge, only the *destination* plus its conditions. There is no
//! backlink from an edge to the species that triggers it; see
//! [`crate::inference`] for how the source is recovered.

use serde::{Deserialize, Serialize};

/// Species identifier. Doubles as the ordinal key for ancestry inference.
pub type SpeciesId = u32;
/// Evolution chain identifier (grouping key).
pub type ChainId = u32;
/// Upstream evolution row identifier (tie-breaker for duplicate targets).
pub type EdgeId = u32;

/// A species as listed by the chain membership loader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeciesRef {
    /// Species identifier.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
}

/// A stored species row (dataset form, carries its chain).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    /// Species identifier.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
    /// Chain this species belongs to.
    pub chain_id: ChainId,
}

impl SpeciesRecord {
    /// Drop the chain key, keeping what the resolver needs per node.
    pub fn to_ref(&self) -> SpeciesRef {
        SpeciesRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Result of the chain membership loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMembership {
    /// Chain the requested species belongs to.
    pub chain_id: ChainId,
    /// Every species of the chain, ascending by id.
    pub species: Vec<SpeciesRef>,
}

/// Gender restriction on an evolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Only female individuals evolve.
    Female,
    /// Only male individuals evolve.
    Male,
}

/// Attack vs. Defense comparison required to evolve.
///
/// Stored upstream as `1`, `0` or `-1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "i8", into = "i8")]
pub enum RelativePhysicalStats {
    /// Attack strictly above Defense.
    AttackHigher,
    /// Attack equal to Defense.
    Equal,
    /// Attack strictly below Defense.
    AttackLower,
}

impl TryFrom<i8> for RelativePhysicalStats {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::AttackHigher),
            0 => Ok(Self::Equal),
            -1 => Ok(Self::AttackLower),
            other => Err(format!("relative physical stats out of range: {other}")),
        }
    }
}

impl From<RelativePhysicalStats> for i8 {
    fn from(value: RelativePhysicalStats) -> Self {
        match value {
            RelativePhysicalStats::AttackHigher => 1,
            RelativePhysicalStats::Equal => 0,
            RelativePhysicalStats::AttackLower => -1,
        }
    }
}

/// Conditions attached to one evolution edge. Any subset may be populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionConditions {
    /// Minimum level.
    #[serde(default, rename = "level", skip_serializing_if = "Option::is_none")]
    pub min_level: Option<u32>,
    /// Joined name of the required item (used or held).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    /// Minimum friendship.
    #[serde(default, rename = "happiness", skip_serializing_if = "Option::is_none")]
    pub min_happiness: Option<u32>,
    /// Minimum affection.
    #[serde(default, rename = "affection", skip_serializing_if = "Option::is_none")]
    pub min_affection: Option<u32>,
    /// Time of day slug (`day`, `night`, `dusk`). Empty means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
    /// Joined name of a move the species must know.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_move_name: Option<String>,
    /// Joined name of the required location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    /// Gender restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Attack/Defense comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_physical_stats: Option<RelativePhysicalStats>,
    /// Overworld rain required.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_rain: bool,
    /// Minimum beauty.
    #[serde(default, rename = "beauty", skip_serializing_if = "Option::is_none")]
    pub min_beauty: Option<u32>,
    /// Evolution happens on trade.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_trade: bool,
}

impl EvolutionConditions {
    /// Time of day, treating the empty upstream string as unset.
    pub fn time_of_day(&self) -> Option<&str> {
        self.time_of_day.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Returns `true` when the edge is gated by a minimum level.
    pub fn is_level_based(&self) -> bool {
        self.min_level.is_some()
    }
}

/// One evolution event: the destination species plus its trigger conditions.
///
/// There is deliberately no source species field; `source_hint` is only set
/// when an upstream schema supplies one explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionEdge {
    /// Upstream row id.
    pub id: EdgeId,
    /// Species reached by this evolution.
    pub target_species_id: SpeciesId,
    /// Trigger conditions.
    #[serde(flatten)]
    pub conditions: EvolutionConditions,
    /// Upstream trigger slug (`level-up`, `trade`, `use-item`, `shed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Explicit source species, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<SpeciesId>,
}

impl EvolutionEdge {
    /// Edge to `target` with no conditions.
    pub fn new(id: EdgeId, target: SpeciesId) -> Self {
        Self {
            id,
            target_species_id: target,
            conditions: EvolutionConditions::default(),
            trigger: None,
            source_hint: None,
        }
    }

    /// Builder-style setter for the condition set.
    pub fn with_conditions(mut self, conditions: EvolutionConditions) -> Self {
        self.conditions = conditions;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_decodes_flat_upstream_row() {
        let json = r#"{
            "id": 7,
            "targetSpeciesId": 106,
            "level": 20,
            "relativePhysicalStats": 1,
            "trigger": "level-up"
        }"#;
        let edge: EvolutionEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.target_species_id, 106);
        assert_eq!(edge.conditions.min_level, Some(20));
        assert_eq!(
            edge.conditions.relative_physical_stats,
            Some(RelativePhysicalStats::AttackHigher)
        );
        assert!(!edge.conditions.is_trade);
        assert_eq!(edge.source_hint, None);
    }

    #[test]
    fn relative_stats_reject_out_of_range() {
        let json = r#"{ "id": 1, "targetSpeciesId": 2, "relativePhysicalStats": 3 }"#;
        assert!(serde_json::from_str::<EvolutionEdge>(json).is_err());
    }

    #[test]
    fn blank_time_of_day_is_unset() {
        let conditions = EvolutionConditions {
            time_of_day: Some(String::new()),
            ..EvolutionConditions::default()
        };
        assert_eq!(conditions.time_of_day(), None);
    }
}
