// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Evolution chain resolver for the Dex species database.
//!
//! The relational source records, per species, only which evolution chain it
//! belongs to and, per evolution edge, only the *destination* species plus the
//! conditions to reach it. `dex-evolution` rebuilds the full, possibly
//! branching tree from that:
//!
//! 1. [`EvolutionStore`] loads chain membership and the chain's edges.
//! 2. [`infer_ancestry`] recovers each edge's source from ordinal adjacency
//!    into an explicit `parent → children` map.
//! 3. [`build_chain`] assembles one tree per base species, bounded in depth.
//! 4. [`format_requirements`] renders each edge's conditions.
//!
//! [`Resolver`] wires the steps together and returns a [`Resolution`].
//!
//! # Determinism Invariant
//!
//! Identical loader output produces byte-identical JSON: members and edges are
//! re-sorted by id before inference, children are emitted ascending, and the
//! requirement text depends only on the edge.
//!
//! # Failure Policy
//!
//! Only storage failures are errors ([`ResolveError::DataUnavailable`]).
//! Malformed chains produce a best-effort tree plus [`Diagnostic`]s.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod diagnostics;
pub mod inference;
mod memory;
pub mod model;
pub mod requirement;
mod resolver;
mod store;
pub mod tree;

pub use diagnostics::Diagnostic;
pub use inference::{infer_ancestry, Ancestry};
pub use memory::{Dataset, MemoryStore};
pub use model::{
    ChainId, ChainMembership, EdgeId, EvolutionConditions, EvolutionEdge, Gender,
    RelativePhysicalStats, SpeciesId, SpeciesRecord, SpeciesRef,
};
pub use requirement::{format_requirements, requirement_clauses, DEFAULT_CLAUSE, DEFAULT_SEPARATOR};
pub use resolver::{
    EvolutionLink, EvolutionLinks, Resolution, ResolveError, Resolver, ResolverOptions,
    DEFAULT_MAX_DEPTH,
};
pub use store::{EvolutionStore, StoreError};
pub use tree::{build_chain, EvolutionChain, EvolutionNode};
