// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ancestry inference: recover each edge's source from ordinal adjacency.
//!
//! Edges only name their destination. Sources are recovered from the chain's
//! members sorted ascending by id, on the upstream convention that a later
//! stage always carries a larger id than the species it evolves from.
//!
//! # Rules
//!
//! - A species that no edge targets is a base (tree root). With no such species
//!   the smallest id is promoted.
//! - An evolved species becomes a child of the nearest preceding species on
//!   the current root-to-leaf path that *claims* it. A preceding evolved
//!   species claims a later one when the later edge is a further stage:
//!   both are level gated and the later level is strictly higher, or the
//!   earlier edge is level gated and the later one is not. Bases claim
//!   everything. Unclaimed candidates therefore share a predecessor, which is
//!   what yields branching chains.
//! - An un-evolved species after a tree has started evolving starts a new tree.
//!   While the current base is still childless it is only set aside as a
//!   separate base and the current base keeps scanning.
//! - An explicit `source_hint` naming another chain member overrides all of
//!   the above.
//!
//! The pass is a single walk over the sorted members with a stack holding the
//! current path; the resulting adjacency map is built once and never
//! re-derived per tree level.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostics::Diagnostic;
use crate::model::{ChainId, EvolutionConditions, EvolutionEdge, SpeciesId, SpeciesRef};

/// Explicit `parent → children` relation for one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestry {
    species: Vec<SpeciesRef>,
    roots: Vec<SpeciesId>,
    children: BTreeMap<SpeciesId, Vec<SpeciesId>>,
    parent: BTreeMap<SpeciesId, SpeciesId>,
    incoming: BTreeMap<SpeciesId, EvolutionEdge>,
}

impl Ancestry {
    /// Chain members, ascending and de-duplicated by id.
    pub fn species(&self) -> &[SpeciesRef] {
        &self.species
    }

    /// Tree roots in ascending id order.
    pub fn roots(&self) -> &[SpeciesId] {
        &self.roots
    }

    /// Direct evolutions of `id`, ascending.
    pub fn children(&self, id: SpeciesId) -> &[SpeciesId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Inferred pre-evolution of `id`.
    pub fn parent(&self, id: SpeciesId) -> Option<SpeciesId> {
        self.parent.get(&id).copied()
    }

    /// Edge that reaches `id`, after duplicate resolution.
    pub fn incoming(&self, id: SpeciesId) -> Option<&EvolutionEdge> {
        self.incoming.get(&id)
    }

    /// Display name of a member.
    pub fn name(&self, id: SpeciesId) -> Option<&str> {
        self.species
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| self.species[idx].name.as_str())
    }

    /// Returns `true` if `id` is a root.
    pub fn is_root(&self, id: SpeciesId) -> bool {
        self.roots.contains(&id)
    }

    fn link(&mut self, parent: SpeciesId, child: SpeciesId) {
        self.children.entry(parent).or_default().push(child);
        self.parent.insert(child, parent);
    }
}

/// Returns `true` when `later` reads as a further stage of `earlier`.
fn claims(earlier: &EvolutionConditions, later: &EvolutionConditions) -> bool {
    match (earlier.min_level, later.min_level) {
        (Some(earlier_level), Some(later_level)) => later_level > earlier_level,
        _ => earlier.is_level_based() && !later.is_level_based(),
    }
}

/// Root-to-`id` path through already linked parents, if it ends at a base.
fn rooted_lineage(
    ancestry: &Ancestry,
    bases: &BTreeSet<SpeciesId>,
    id: SpeciesId,
) -> Option<Vec<SpeciesId>> {
    let mut lineage = vec![id];
    let mut current = id;
    while !bases.contains(&current) {
        current = ancestry.parent(current)?;
        // Hint cycles never reach a base.
        if lineage.contains(&current) {
            return None;
        }
        lineage.push(current);
    }
    lineage.reverse();
    Some(lineage)
}

/// Infer the ancestry of one chain.
///
/// `species` may arrive in any order and with repeats; edges in any order.
/// Findings that do not stop inference are returned alongside the result.
pub fn infer_ancestry(
    chain_id: ChainId,
    species: &[SpeciesRef],
    edges: &[EvolutionEdge],
) -> (Ancestry, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut ancestry = Ancestry::default();

    let mut members = species.to_vec();
    members.sort_by_key(|s| s.id);
    members.dedup_by_key(|s| s.id);
    let member_ids: BTreeSet<SpeciesId> = members.iter().map(|s| s.id).collect();

    let mut sorted_edges: Vec<&EvolutionEdge> = edges.iter().collect();
    sorted_edges.sort_by_key(|e| e.id);
    for edge in sorted_edges {
        if !member_ids.contains(&edge.target_species_id) {
            diagnostics.push(Diagnostic::ForeignEdge {
                edge: edge.id,
                target: edge.target_species_id,
            });
            continue;
        }
        match ancestry.incoming.get(&edge.target_species_id) {
            Some(kept) => diagnostics.push(Diagnostic::DuplicateEdge {
                target: edge.target_species_id,
                kept: kept.id,
                discarded: edge.id,
            }),
            None => {
                ancestry
                    .incoming
                    .insert(edge.target_species_id, edge.clone());
            }
        }
    }

    let mut bases: Vec<SpeciesId> = member_ids
        .iter()
        .copied()
        .filter(|id| !ancestry.incoming.contains_key(id))
        .collect();
    if bases.is_empty() {
        if let Some(first) = members.first() {
            diagnostics.push(Diagnostic::NoBaseSpecies {
                chain_id,
                fallback: first.id,
            });
            bases.push(first.id);
        }
    } else if bases.len() > 1 {
        diagnostics.push(Diagnostic::MultipleBases {
            chain_id,
            bases: bases.clone(),
        });
    }
    let base_set: BTreeSet<SpeciesId> = bases.iter().copied().collect();

    let mut path: Vec<SpeciesId> = Vec::new();
    for member in &members {
        let id = member.id;
        if base_set.contains(&id) {
            ancestry.roots.push(id);
            let lone_base =
                path.len() == 1 && !ancestry.children.contains_key(&path[0]);
            if !lone_base {
                path.clear();
                path.push(id);
            }
            continue;
        }

        let Some(edge) = ancestry.incoming.get(&id).cloned() else {
            continue;
        };

        if let Some(hint) = edge.source_hint {
            if hint != id && member_ids.contains(&hint) {
                ancestry.link(hint, id);
                if let Some(pos) = path.iter().position(|p| *p == hint) {
                    path.truncate(pos + 1);
                    path.push(id);
                } else if let Some(mut lineage) = rooted_lineage(&ancestry, &base_set, hint) {
                    lineage.push(id);
                    path = lineage;
                }
                continue;
            }
            diagnostics.push(Diagnostic::InvalidSourceHint {
                edge: edge.id,
                hint,
            });
        }

        while let Some(&top) = path.last() {
            if base_set.contains(&top) {
                break;
            }
            let claimed = ancestry
                .incoming
                .get(&top)
                .is_some_and(|top_edge| claims(&top_edge.conditions, &edge.conditions));
            if claimed {
                break;
            }
            path.pop();
        }
        if let Some(&parent) = path.last() {
            ancestry.link(parent, id);
            path.push(id);
        }
    }

    ancestry.species = members;
    (ancestry, diagnostics)
}
