// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Non-fatal data-integrity findings raised while resolving a chain.

use serde::Serialize;

use crate::model::{ChainId, EdgeId, SpeciesId};

/// A data-integrity warning. Never aborts resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Every chain member is an evolution target; the smallest id was used as base.
    #[serde(rename_all = "camelCase")]
    NoBaseSpecies {
        /// Chain being resolved.
        chain_id: ChainId,
        /// Species promoted to base.
        fallback: SpeciesId,
    },
    /// The chain holds several untargeted species; one tree per base is returned.
    #[serde(rename_all = "camelCase")]
    MultipleBases {
        /// Chain being resolved.
        chain_id: ChainId,
        /// Every base, ascending.
        bases: Vec<SpeciesId>,
    },
    /// Two or more edges target the same species; the lowest edge id was kept.
    #[serde(rename_all = "camelCase")]
    DuplicateEdge {
        /// Species targeted more than once.
        target: SpeciesId,
        /// Edge kept.
        kept: EdgeId,
        /// Edge ignored.
        discarded: EdgeId,
    },
    /// An edge targets a species outside the chain and was ignored.
    #[serde(rename_all = "camelCase")]
    ForeignEdge {
        /// Offending edge.
        edge: EdgeId,
        /// Its target.
        target: SpeciesId,
    },
    /// An explicit source hint named a non-member or the target itself.
    #[serde(rename_all = "camelCase")]
    InvalidSourceHint {
        /// Edge carrying the hint.
        edge: EdgeId,
        /// Hinted species.
        hint: SpeciesId,
    },
    /// A branch hit the depth ceiling and was cut below `species`.
    #[serde(rename_all = "camelCase")]
    DepthExceeded {
        /// Last species emitted on the branch.
        species: SpeciesId,
        /// Configured ceiling.
        max_depth: usize,
        /// Every species left out of the tree by the cut, ascending.
        dropped: Vec<SpeciesId>,
    },
    /// A chain member could not be reached from any base.
    #[serde(rename_all = "camelCase")]
    Unreachable {
        /// Orphaned species.
        species: SpeciesId,
    },
}

impl Diagnostic {
    /// Species this finding leaves out of the tree.
    pub fn omitted(&self) -> &[SpeciesId] {
        match self {
            Self::DepthExceeded { dropped, .. } => dropped,
            Self::Unreachable { species } => std::slice::from_ref(species),
            _ => &[],
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBaseSpecies { chain_id, fallback } => write!(
                f,
                "chain {chain_id} has no untargeted species; using {fallback} as base"
            ),
            Self::MultipleBases { chain_id, bases } => {
                write!(f, "chain {chain_id} has {} bases: {bases:?}", bases.len())
            }
            Self::DuplicateEdge {
                target,
                kept,
                discarded,
            } => write!(
                f,
                "species {target} targeted by edges {kept} and {discarded}; kept {kept}"
            ),
            Self::ForeignEdge { edge, target } => {
                write!(f, "edge {edge} targets {target} outside the chain")
            }
            Self::InvalidSourceHint { edge, hint } => {
                write!(f, "edge {edge} names invalid source {hint}")
            }
            Self::DepthExceeded {
                species,
                max_depth,
                dropped,
            } => write!(
                f,
                "branch below {species} exceeds depth {max_depth}; dropped {dropped:?}"
            ),
            Self::Unreachable { species } => {
                write!(f, "species {species} is unreachable from any base")
            }
        }
    }
}
