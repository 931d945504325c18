// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved preferences for Dex services (bind address, dataset, resolver tunables).

use std::path::PathBuf;

use dex_evolution::{ResolverOptions, DEFAULT_MAX_DEPTH, DEFAULT_SEPARATOR};
use serde::{Deserialize, Serialize};

/// Config key under which `dexd` stores its preferences.
pub const SERVICE_PREFS_KEY: &str = "dexd";

/// Preferences for the HTTP daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicePrefs {
    /// Socket address to listen on.
    pub bind: String,
    /// JSON dataset backing the in-memory store.
    pub dataset: PathBuf,
    /// Resolver tunables.
    pub resolver: ResolverPrefs,
}

impl Default for ServicePrefs {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:2727".to_owned(),
            dataset: PathBuf::from("data/sample-dataset.json"),
            resolver: ResolverPrefs::default(),
        }
    }
}

/// Resolver tunables as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverPrefs {
    /// Maximum tree depth before truncation.
    pub max_depth: usize,
    /// Separator between requirement clauses.
    pub clause_separator: String,
}

impl Default for ResolverPrefs {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            clause_separator: DEFAULT_SEPARATOR.to_owned(),
        }
    }
}

impl From<ResolverPrefs> for ResolverOptions {
    fn from(prefs: ResolverPrefs) -> Self {
        Self {
            max_depth: prefs.max_depth,
            clause_separator: prefs.clause_separator,
        }
    }
}
