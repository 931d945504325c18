// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for Dex tools.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failures reading or writing persisted config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("config key not found")]
    NotFound,
    /// Key is empty or would escape the store (`.`-prefixed, path separators).
    #[error("invalid config key {0:?}")]
    InvalidKey(String),
    /// The store has no place to keep config on this platform.
    #[error("no config directory available")]
    NoConfigDir,
    /// I/O error while reading/writing.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    /// Stored blob for `key` is not valid JSON for the requested type.
    #[error("config {key:?} is unreadable: {source}")]
    Decode {
        /// Key whose blob failed to decode.
        key: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },
    /// Value could not be encoded as JSON.
    #[error("config encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serializes config values as JSON and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing or empty.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| ConfigError::Decode {
                    key: key.to_owned(),
                    source,
                }),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load `key`, falling back to `T::default()` when it is missing.
    pub fn load_or_default<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}
