// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resolver entry point: loader → inference → builder → formatter.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::diagnostics::Diagnostic;
use crate::inference::{infer_ancestry, Ancestry};
use crate::model::SpeciesId;
use crate::requirement::{format_requirements, DEFAULT_SEPARATOR};
use crate::store::{EvolutionStore, StoreError};
use crate::tree::{build_chain, EvolutionChain};

/// Default recursion ceiling for the tree builder.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Errors surfaced to callers. Data-integrity problems are diagnostics, not errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A storage read failed; no retry is attempted here.
    #[error("evolution data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),
}

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Maximum tree depth in levels before a branch is truncated.
    pub max_depth: usize,
    /// Separator placed between requirement clauses.
    pub clause_separator: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            clause_separator: DEFAULT_SEPARATOR.to_owned(),
        }
    }
}

/// Pre-evolution or evolution of one species.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionLink {
    /// Linked species.
    pub id: SpeciesId,
    /// Its display name.
    pub name: String,
    /// Requirement of the edge between the two species.
    pub requirements: String,
}

/// Immediate neighbourhood of one species in its chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionLinks {
    /// Species this one evolves from, if any.
    pub evolves_from: Option<EvolutionLink>,
    /// Direct evolutions, ascending by id.
    pub evolves_to: Vec<EvolutionLink>,
}

/// Outcome of one resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Tree value returned to callers.
    pub chain: EvolutionChain,
    /// Non-fatal findings, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    ancestry: Ancestry,
    separator: String,
}

impl Resolution {
    /// Pre-evolution and direct evolutions of `species`.
    ///
    /// Returns `None` when the species is not a member of the resolved chain.
    pub fn links(&self, species: SpeciesId) -> Option<EvolutionLinks> {
        let ancestry = &self.ancestry;
        ancestry.name(species)?;

        let link = |id: SpeciesId, edge_target: SpeciesId| EvolutionLink {
            id,
            name: ancestry.name(id).unwrap_or_default().to_owned(),
            requirements: ancestry
                .incoming(edge_target)
                .map(|edge| {
                    format_requirements(&edge.conditions, edge.trigger.as_deref(), &self.separator)
                })
                .unwrap_or_default(),
        };

        let evolves_from = if ancestry.is_root(species) {
            None
        } else {
            ancestry.parent(species).map(|parent| link(parent, species))
        };
        let evolves_to = ancestry
            .children(species)
            .iter()
            .map(|&child| link(child, child))
            .collect();
        Some(EvolutionLinks {
            evolves_from,
            evolves_to,
        })
    }
}

/// Stateless, re-entrant evolution chain resolver.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    /// Create a resolver with the given options.
    pub fn new(options: ResolverOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve the full evolution forest containing `species`.
    ///
    /// An unknown species yields an empty chain. Every diagnostic is also
    /// logged at `warn`.
    pub fn resolve<S>(&self, store: &S, species: SpeciesId) -> Result<Resolution, ResolveError>
    where
        S: EvolutionStore + ?Sized,
    {
        let Some(membership) = store.chain_membership(species)? else {
            debug!(species, "species not found; empty chain");
            return Ok(Resolution {
                separator: self.options.clause_separator.clone(),
                ..Resolution::default()
            });
        };
        let edges = store.evolution_edges(membership.chain_id)?;

        let (ancestry, mut diagnostics) =
            infer_ancestry(membership.chain_id, &membership.species, &edges);
        let (chain, built) = build_chain(
            &ancestry,
            species,
            self.options.max_depth,
            &self.options.clause_separator,
        );
        diagnostics.extend(built);

        for diagnostic in &diagnostics {
            warn!(chain_id = membership.chain_id, species, "{diagnostic}");
        }
        debug!(
            chain_id = membership.chain_id,
            species,
            members = membership.species.len(),
            edges = edges.len(),
            trees = chain.chain.len(),
            omitted = diagnostics.iter().map(|d| d.omitted().len()).sum::<usize>(),
            "resolved evolution chain"
        );

        Ok(Resolution {
            chain,
            diagnostics,
            ancestry,
            separator: self.options.clause_separator.clone(),
        })
    }
}
