// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory evolution store backed by a JSON dataset.
//!
//! [`MemoryStore`] indexes a [`Dataset`] once at construction. Reads never
//! mutate, so one store can be shared behind an `Arc` by concurrent resolvers
//! without locking.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ChainId, ChainMembership, EvolutionEdge, SpeciesId, SpeciesRecord, SpeciesRef};
use crate::store::{EvolutionStore, StoreError};

/// Raw dataset: species rows plus destination-only evolution rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    /// Species rows.
    #[serde(default)]
    pub species: Vec<SpeciesRecord>,
    /// Evolution rows.
    #[serde(default)]
    pub edges: Vec<EvolutionEdge>,
}

/// In-memory [`EvolutionStore`].
///
/// # Indexing Invariants
///
/// - Chain member lists are sorted ascending by species id.
/// - An edge is filed under the chain of its target species; edges whose
///   target is not a known species are dropped at construction.
/// - A species id seen twice keeps its first row.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    species: BTreeMap<SpeciesId, SpeciesRecord>,
    chains: BTreeMap<ChainId, Vec<SpeciesRef>>,
    edges: BTreeMap<ChainId, Vec<EvolutionEdge>>,
}

impl MemoryStore {
    /// Index a dataset.
    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut species: BTreeMap<SpeciesId, SpeciesRecord> = BTreeMap::new();
        for record in dataset.species {
            species.entry(record.id).or_insert(record);
        }

        let mut chains: BTreeMap<ChainId, Vec<SpeciesRef>> = BTreeMap::new();
        // BTreeMap iteration is ascending, so every member list comes out sorted.
        for record in species.values() {
            chains.entry(record.chain_id).or_default().push(record.to_ref());
        }

        let mut edges: BTreeMap<ChainId, Vec<EvolutionEdge>> = BTreeMap::new();
        let mut dropped = 0usize;
        for edge in dataset.edges {
            match species.get(&edge.target_species_id) {
                Some(target) => edges.entry(target.chain_id).or_default().push(edge),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "memory store dropped edges with unknown targets");
        }

        Self {
            species,
            chains,
            edges,
        }
    }

    /// Decode and index a JSON dataset.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, StoreError> {
        let dataset: Dataset = serde_json::from_slice(bytes)?;
        Ok(Self::from_dataset(dataset))
    }

    /// Read, decode and index a JSON dataset file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Number of species indexed.
    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Number of distinct chains indexed.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }
}

impl EvolutionStore for MemoryStore {
    fn chain_membership(&self, species: SpeciesId) -> Result<Option<ChainMembership>, StoreError> {
        let Some(record) = self.species.get(&species) else {
            return Ok(None);
        };
        let members = self.chains.get(&record.chain_id).cloned().unwrap_or_default();
        Ok(Some(ChainMembership {
            chain_id: record.chain_id,
            species: members,
        }))
    }

    fn evolution_edges(&self, chain: ChainId) -> Result<Vec<EvolutionEdge>, StoreError> {
        Ok(self.edges.get(&chain).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: SpeciesId, name: &str, chain_id: ChainId) -> SpeciesRecord {
        SpeciesRecord {
            id,
            name: name.into(),
            chain_id,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            species: vec![
                record(3, "venusaur", 1),
                record(1, "bulbasaur", 1),
                record(2, "ivysaur", 1),
                record(25, "pikachu", 10),
            ],
            edges: vec![
                EvolutionEdge::new(2, 3),
                EvolutionEdge::new(1, 2),
                EvolutionEdge::new(99, 404),
            ],
        }
    }

    #[test]
    fn membership_is_sorted_by_id() {
        let store = MemoryStore::from_dataset(dataset());
        let membership = store.chain_membership(3).unwrap().unwrap();
        assert_eq!(membership.chain_id, 1);
        let ids: Vec<_> = membership.species.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unknown_species_is_absent_not_error() {
        let store = MemoryStore::from_dataset(dataset());
        assert!(store.chain_membership(9999).unwrap().is_none());
    }

    #[test]
    fn edges_are_filed_under_target_chain() {
        let store = MemoryStore::from_dataset(dataset());
        assert_eq!(store.evolution_edges(1).unwrap().len(), 2);
        assert!(store.evolution_edges(10).unwrap().is_empty());
        assert!(store.evolution_edges(77).unwrap().is_empty());
    }

    #[test]
    fn duplicate_species_rows_keep_first() {
        let mut data = dataset();
        data.species.push(record(1, "impostor", 42));
        let store = MemoryStore::from_dataset(data);
        assert_eq!(store.species_count(), 4);
        assert_eq!(store.chain_count(), 2);
        let membership = store.chain_membership(1).unwrap().unwrap();
        assert_eq!(membership.species[0].name, "bulbasaur");
    }

    #[test]
    fn decodes_camel_case_dataset() {
        let json = br#"{
            "species": [
                { "id": 133, "name": "eevee", "chainId": 67 },
                { "id": 134, "name": "vaporeon", "chainId": 67 }
            ],
            "edges": [
                { "id": 1, "targetSpeciesId": 134, "itemName": "water-stone", "trigger": "use-item" }
            ]
        }"#;
        let store = MemoryStore::from_json_slice(json).unwrap();
        let edges = store.evolution_edges(67).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].conditions.item_name.as_deref(), Some("water-stone"));
    }

    #[test]
    fn malformed_dataset_is_decode_error() {
        let err = MemoryStore::from_json_slice(b"{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
