// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tree builder: turns an [`Ancestry`] into the serialized chain shape.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostic;
use crate::inference::Ancestry;
use crate::model::SpeciesId;
use crate::requirement::format_requirements;

/// One species in a resolved chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionNode {
    /// Species identifier.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
    /// Marks the species the caller asked about.
    pub is_queried_species: bool,
    /// How this species is reached from its parent; `None` only for roots.
    pub requirements: Option<String>,
    /// Direct evolutions, ascending by id.
    pub evolves_to: Vec<EvolutionNode>,
    /// Set when the depth ceiling cut this node's descendants.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl EvolutionNode {
    /// Depth of the subtree rooted here (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.evolves_to.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Depth-first search for `id` in this subtree.
    pub fn find(&self, id: SpeciesId) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.evolves_to.iter().find_map(|child| child.find(id))
    }

    /// Pre-order visit of every id in the subtree.
    pub fn collect_ids(&self, out: &mut Vec<SpeciesId>) {
        out.push(self.id);
        for child in &self.evolves_to {
            child.collect_ids(out);
        }
    }
}

/// Resolved evolution forest. An empty `chain` means "no data".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvolutionChain {
    /// One tree per base species, ascending by base id.
    pub chain: Vec<EvolutionNode>,
}

impl EvolutionChain {
    /// Returns `true` if no tree was produced.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Locate a species anywhere in the forest.
    pub fn find(&self, id: SpeciesId) -> Option<&EvolutionNode> {
        self.chain.iter().find_map(|root| root.find(id))
    }

    /// Every species id in the forest, pre-order.
    pub fn species_ids(&self) -> Vec<SpeciesId> {
        let mut out = Vec::new();
        for root in &self.chain {
            root.collect_ids(&mut out);
        }
        out
    }
}

struct TreeBuilder<'a> {
    ancestry: &'a Ancestry,
    queried: SpeciesId,
    max_depth: usize,
    separator: &'a str,
    seen: BTreeSet<SpeciesId>,
    diagnostics: Vec<Diagnostic>,
}

impl TreeBuilder<'_> {
    fn node(&mut self, id: SpeciesId, depth: usize) -> EvolutionNode {
        self.seen.insert(id);
        let requirements = if self.ancestry.is_root(id) {
            None
        } else {
            self.ancestry.incoming(id).map(|edge| {
                format_requirements(&edge.conditions, edge.trigger.as_deref(), self.separator)
            })
        };
        let mut node = EvolutionNode {
            id,
            name: self.ancestry.name(id).unwrap_or_default().to_owned(),
            is_queried_species: id == self.queried,
            requirements,
            evolves_to: Vec::new(),
            truncated: false,
        };

        let children: Vec<SpeciesId> = self
            .ancestry
            .children(id)
            .iter()
            .copied()
            .filter(|child| !self.seen.contains(child))
            .collect();
        if children.is_empty() {
            return node;
        }
        if depth >= self.max_depth {
            node.truncated = true;
            let dropped = self.mark_cut(children);
            self.diagnostics.push(Diagnostic::DepthExceeded {
                species: id,
                max_depth: self.max_depth,
                dropped,
            });
            return node;
        }
        for child in children {
            // A cycle through source hints can revisit a sibling's subtree.
            if self.seen.contains(&child) {
                continue;
            }
            let built = self.node(child, depth + 1);
            node.evolves_to.push(built);
        }
        node
    }

    /// Mark every descendant below a cut as seen and return them ascending.
    fn mark_cut(&mut self, mut pending: Vec<SpeciesId>) -> Vec<SpeciesId> {
        let mut dropped = Vec::new();
        while let Some(id) = pending.pop() {
            if self.seen.insert(id) {
                dropped.push(id);
                pending.extend(self.ancestry.children(id).iter().copied());
            }
        }
        dropped.sort_unstable();
        dropped
    }
}

/// Build the forest for `ancestry`, marking `queried`.
///
/// `max_depth` counts levels (a lone root is depth 1) and is clamped to at
/// least 1. Returns the chain and the builder's own diagnostics
/// (`DepthExceeded`, `Unreachable`). Every member is either in the chain or
/// named by exactly one of them.
pub fn build_chain(
    ancestry: &Ancestry,
    queried: SpeciesId,
    max_depth: usize,
    separator: &str,
) -> (EvolutionChain, Vec<Diagnostic>) {
    let mut builder = TreeBuilder {
        ancestry,
        queried,
        max_depth: max_depth.max(1),
        separator,
        seen: BTreeSet::new(),
        diagnostics: Vec::new(),
    };

    let mut chain = EvolutionChain::default();
    for &root in ancestry.roots() {
        if builder.seen.contains(&root) {
            continue;
        }
        let tree = builder.node(root, 1);
        chain.chain.push(tree);
    }

    for species in ancestry.species() {
        if !builder.seen.contains(&species.id) {
            builder
                .diagnostics
                .push(Diagnostic::Unreachable { species: species.id });
        }
    }
    (chain, builder.diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::infer_ancestry;
    use crate::model::{EvolutionConditions, EvolutionEdge, SpeciesRef};
    use crate::requirement::DEFAULT_SEPARATOR;

    fn members(ids: &[SpeciesId]) -> Vec<SpeciesRef> {
        ids.iter()
            .map(|id| SpeciesRef {
                id: *id,
                name: format!("species-{id}"),
            })
            .collect()
    }

    fn level_line(len: u32) -> (Vec<SpeciesRef>, Vec<EvolutionEdge>) {
        let ids: Vec<SpeciesId> = (1..=len).collect();
        let edges = (2..=len)
            .map(|t| {
                EvolutionEdge::new(t, t).with_conditions(EvolutionConditions {
                    min_level: Some(t * 5),
                    ..EvolutionConditions::default()
                })
            })
            .collect();
        (members(&ids), edges)
    }

    #[test]
    fn root_has_no_requirement_and_children_do() {
        let (species, edges) = level_line(3);
        let (ancestry, _) = infer_ancestry(1, &species, &edges);
        let (chain, diags) = build_chain(&ancestry, 2, 10, DEFAULT_SEPARATOR);
        assert!(diags.is_empty());
        let root = &chain.chain[0];
        assert_eq!(root.requirements, None);
        assert!(!root.is_queried_species);
        let mid = &root.evolves_to[0];
        assert!(mid.is_queried_species);
        assert_eq!(mid.requirements.as_deref(), Some("Level 10"));
        assert_eq!(chain.chain[0].depth(), 3);
    }

    #[test]
    fn depth_ceiling_truncates_and_reports() {
        let (species, edges) = level_line(14);
        let (ancestry, _) = infer_ancestry(1, &species, &edges);
        let (chain, diags) = build_chain(&ancestry, 1, 10, DEFAULT_SEPARATOR);
        assert_eq!(chain.chain[0].depth(), 10);
        let last = chain.find(10).unwrap();
        assert!(last.truncated);
        assert!(last.evolves_to.is_empty());
        assert_eq!(
            diags,
            vec![Diagnostic::DepthExceeded {
                species: 10,
                max_depth: 10,
                dropped: vec![11, 12, 13, 14],
            }]
        );
    }

    #[test]
    fn shallow_ceiling_names_every_cut_species() {
        let (species, edges) = level_line(14);
        let (ancestry, _) = infer_ancestry(1, &species, &edges);
        let (chain, diags) = build_chain(&ancestry, 1, 3, DEFAULT_SEPARATOR);
        assert_eq!(chain.species_ids(), vec![1, 2, 3]);
        let omitted: Vec<SpeciesId> = diags.iter().flat_map(|d| d.omitted().to_vec()).collect();
        assert_eq!(omitted, (4..=14).collect::<Vec<_>>());
    }

    #[test]
    fn hint_cycle_is_reported_unreachable() {
        let mut to_two = EvolutionEdge::new(1, 2);
        to_two.source_hint = Some(3);
        let mut to_three = EvolutionEdge::new(2, 3);
        to_three.source_hint = Some(2);
        let (ancestry, _) = infer_ancestry(1, &members(&[1, 2, 3]), &[to_two, to_three]);
        let (chain, diags) = build_chain(&ancestry, 1, 10, DEFAULT_SEPARATOR);
        assert_eq!(chain.species_ids(), vec![1]);
        assert!(diags.contains(&Diagnostic::Unreachable { species: 2 }));
        assert!(diags.contains(&Diagnostic::Unreachable { species: 3 }));
    }

    #[test]
    fn serializes_camel_case_shape() {
        let (species, edges) = level_line(2);
        let (ancestry, _) = infer_ancestry(1, &species, &edges);
        let (chain, _) = build_chain(&ancestry, 1, 10, DEFAULT_SEPARATOR);
        let json = serde_json::to_value(&chain).unwrap();
        let root = &json["chain"][0];
        assert_eq!(root["isQueriedSpecies"], true);
        assert!(root["requirements"].is_null());
        assert_eq!(root["evolvesTo"][0]["requirements"], "Level 10");
        assert!(root.get("truncated").is_none());
    }
}
