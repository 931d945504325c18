// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage port consumed by the resolver (chain membership + edge loaders).

use thiserror::Error;

use crate::model::{ChainId, ChainMembership, EvolutionEdge, SpeciesId};

/// Errors raised by a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not serve the read.
    #[error("[STORE_UNAVAILABLE] {0}")]
    Unavailable(String),
    /// I/O failure while loading a dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Dataset could not be decoded.
    #[error("dataset decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read-only evolution data source.
///
/// Implementations are expected to be cheap to share across threads; the
/// resolver never writes through this port and owns no retry policy.
///
/// # Absence Semantics
///
/// [`chain_membership`](EvolutionStore::chain_membership) returns `Ok(None)`
/// for an unknown species. That is a "no data" outcome, not an error; error
/// variants are reserved for reads that could not be served.
pub trait EvolutionStore {
    /// Chain id of `species` and every species sharing it, ascending by id.
    fn chain_membership(&self, species: SpeciesId) -> Result<Option<ChainMembership>, StoreError>;

    /// Every edge whose target belongs to `chain`. Order is unspecified.
    fn evolution_edges(&self, chain: ChainId) -> Result<Vec<EvolutionEdge>, StoreError>;
}

impl<S> EvolutionStore for &S
where
    S: EvolutionStore + ?Sized,
{
    fn chain_membership(&self, species: SpeciesId) -> Result<Option<ChainMembership>, StoreError> {
        (**self).chain_membership(species)
    }

    fn evolution_edges(&self, chain: ChainId) -> Result<Vec<EvolutionEdge>, StoreError> {
        (**self).evolution_edges(chain)
    }
}

impl<S> EvolutionStore for std::sync::Arc<S>
where
    S: EvolutionStore + ?Sized,
{
    fn chain_membership(&self, species: SpeciesId) -> Result<Option<ChainMembership>, StoreError> {
        (**self).chain_membership(species)
    }

    fn evolution_edges(&self, chain: ChainId) -> Result<Vec<EvolutionEdge>, StoreError> {
        (**self).evolution_edges(chain)
    }
}
