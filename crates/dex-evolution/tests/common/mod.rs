// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use dex_evolution::{
    ChainId, Dataset, EvolutionConditions, EvolutionEdge, MemoryStore, SpeciesId, SpeciesRecord,
};

/// Path of the sample dataset shipped at the workspace root.
pub fn sample_dataset_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample-dataset.json")
}

/// Species rows named `species-<id>`, all in `chain_id`.
pub fn species(chain_id: ChainId, ids: &[SpeciesId]) -> Vec<SpeciesRecord> {
    ids.iter()
        .map(|id| SpeciesRecord {
            id: *id,
            name: format!("species-{id}"),
            chain_id,
        })
        .collect()
}

/// Level-gated edge.
pub fn level_edge(id: u32, target: SpeciesId, level: u32) -> EvolutionEdge {
    EvolutionEdge::new(id, target).with_conditions(EvolutionConditions {
        min_level: Some(level),
        ..EvolutionConditions::default()
    })
}

/// Item-gated edge.
pub fn item_edge(id: u32, target: SpeciesId, item: &str) -> EvolutionEdge {
    EvolutionEdge::new(id, target).with_conditions(EvolutionConditions {
        item_name: Some(item.to_owned()),
        ..EvolutionConditions::default()
    })
}

/// Store holding exactly the given rows.
pub fn store(species: Vec<SpeciesRecord>, edges: Vec<EvolutionEdge>) -> MemoryStore {
    MemoryStore::from_dataset(Dataset { species, edges })
}
