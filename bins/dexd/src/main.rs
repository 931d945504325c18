// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dex daemon (dexd)
//!
//! Serves resolved evolution chains from an in-memory dataset:
//! - `GET /pokemon/{id}/evolution` full chain tree
//! - `GET /pokemon/{id}/evolution/links` pre-evolution and direct evolutions
//! - `GET /health`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use dex_app_core::config::ConfigService;
use dex_app_core::prefs::{ServicePrefs, SERVICE_PREFS_KEY};
use dex_config_fs::FsConfigStore;
use dex_evolution::{
    EvolutionChain, EvolutionLinks, EvolutionStore, MemoryStore, Resolution, ResolveError,
    Resolver, SpeciesId,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dex evolution chain daemon")]
struct Args {
    /// Listen address (overrides saved prefs)
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// JSON dataset to serve (overrides saved prefs)
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Directory holding `dexd.json` (defaults to the platform config dir)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Maximum chain depth before truncation (overrides saved prefs)
    #[arg(long)]
    max_depth: Option<usize>,
}

type SharedStore = Arc<dyn EvolutionStore + Send + Sync>;

#[derive(Clone)]
struct AppState {
    store: SharedStore,
    resolver: Arc<Resolver>,
}

/// Failures surfaced to HTTP callers.
#[derive(Debug)]
enum ApiError {
    Unavailable(ResolveError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unavailable(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn load_prefs(args: &Args) -> ServicePrefs {
    // Config (best-effort)
    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    };
    let config = match store {
        Ok(store) => {
            info!("config dir {}", store.base().display());
            Some(ConfigService::new(store))
        }
        Err(err) => {
            warn!("config store unavailable: {err}");
            None
        }
    };

    let loaded = config.as_ref().map(|c| c.load_or_default(SERVICE_PREFS_KEY));
    let mut prefs: ServicePrefs = match loaded {
        Some(Ok(prefs)) => prefs,
        Some(Err(err)) => {
            warn!("ignoring unreadable prefs: {err}");
            ServicePrefs::default()
        }
        None => ServicePrefs::default(),
    };

    // Persist defaults once if absent
    if let Some(cfg) = &config {
        if matches!(cfg.load::<ServicePrefs>(SERVICE_PREFS_KEY), Ok(None)) {
            if let Err(err) = cfg.save(SERVICE_PREFS_KEY, &prefs) {
                warn!("could not persist default prefs: {err}");
            }
        }
    }

    if let Some(bind) = args.bind {
        prefs.bind = bind.to_string();
    }
    if let Some(dataset) = &args.dataset {
        prefs.dataset.clone_from(dataset);
    }
    if let Some(max_depth) = args.max_depth {
        prefs.resolver.max_depth = max_depth;
    }
    prefs
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/pokemon/{id}/evolution", get(evolution_handler))
        .route("/pokemon/{id}/evolution/links", get(links_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let prefs = load_prefs(&args);
    let store = MemoryStore::from_path(&prefs.dataset)
        .with_context(|| format!("load dataset {}", prefs.dataset.display()))?;
    info!(
        species = store.species_count(),
        chains = store.chain_count(),
        "dataset loaded from {}",
        prefs.dataset.display()
    );

    let resolver = Resolver::new(prefs.resolver.into());
    info!(
        max_depth = resolver.options().max_depth,
        separator = %resolver.options().clause_separator,
        "resolver configured"
    );
    let state = AppState {
        store: Arc::new(store),
        resolver: Arc::new(resolver),
    };

    let addr: SocketAddr = prefs
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", prefs.bind))?;
    let listener = TcpListener::bind(addr).await?;
    info!("dexd listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("ctrl-c handler failed: {err}");
            }
        })
        .await?;
    Ok(())
}

async fn resolve(state: &AppState, id: SpeciesId) -> Result<Resolution, ApiError> {
    let state = state.clone();
    // Resolution is synchronous; keep it off the async workers.
    tokio::task::spawn_blocking(move || state.resolver.resolve(state.store.as_ref(), id))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(|err| {
            error!(species = id, "resolution failed: {err}");
            ApiError::Unavailable(err)
        })
}

async fn evolution_handler(
    State(state): State<AppState>,
    Path(id): Path<SpeciesId>,
) -> Result<Json<EvolutionChain>, ApiError> {
    let resolution = resolve(&state, id).await?;
    Ok(Json(resolution.chain))
}

async fn links_handler(
    State(state): State<AppState>,
    Path(id): Path<SpeciesId>,
) -> Result<Json<EvolutionLinks>, ApiError> {
    let resolution = resolve(&state, id).await?;
    Ok(Json(resolution.links(id).unwrap_or_default()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dex_evolution::{
        ChainId, ChainMembership, Dataset, EvolutionConditions, EvolutionEdge, SpeciesRecord,
        StoreError,
    };

    struct OfflineStore;

    impl EvolutionStore for OfflineStore {
        fn chain_membership(
            &self,
            _species: SpeciesId,
        ) -> Result<Option<ChainMembership>, StoreError> {
            Err(StoreError::Unavailable("replica lagging".into()))
        }

        fn evolution_edges(&self, _chain: ChainId) -> Result<Vec<EvolutionEdge>, StoreError> {
            Err(StoreError::Unavailable("replica lagging".into()))
        }
    }

    fn charmander_state() -> AppState {
        let species = [(4, "charmander"), (5, "charmeleon"), (6, "charizard")]
            .into_iter()
            .map(|(id, name)| SpeciesRecord {
                id,
                name: name.into(),
                chain_id: 2,
            })
            .collect();
        let level = |id, target, min_level| {
            EvolutionEdge::new(id, target).with_conditions(EvolutionConditions {
                min_level: Some(min_level),
                ..EvolutionConditions::default()
            })
        };
        let store = MemoryStore::from_dataset(Dataset {
            species,
            edges: vec![level(3, 5, 16), level(4, 6, 36)],
        });
        AppState {
            store: Arc::new(store),
            resolver: Arc::new(Resolver::default()),
        }
    }

    #[tokio::test]
    async fn evolution_route_returns_full_chain() {
        let Json(chain) = evolution_handler(State(charmander_state()), Path(6))
            .await
            .unwrap();
        assert_eq!(chain.species_ids(), vec![4, 5, 6]);
        assert!(chain.find(6).unwrap().is_queried_species);
    }

    #[tokio::test]
    async fn unknown_species_is_empty_chain_not_404() {
        let Json(chain) = evolution_handler(State(charmander_state()), Path(151))
            .await
            .unwrap();
        assert_eq!(serde_json::to_string(&chain).unwrap(), r#"{"chain":[]}"#);
    }

    #[tokio::test]
    async fn links_route_reports_neighbours() {
        let Json(links) = links_handler(State(charmander_state()), Path(5))
            .await
            .unwrap();
        assert_eq!(links.evolves_from.unwrap().id, 4);
        assert_eq!(links.evolves_to[0].requirements, "Level 36");

        let Json(none) = links_handler(State(charmander_state()), Path(999))
            .await
            .unwrap();
        assert_eq!(none, EvolutionLinks::default());
    }

    #[tokio::test]
    async fn store_failure_maps_to_503() {
        let state = AppState {
            store: Arc::new(OfflineStore),
            resolver: Arc::new(Resolver::default()),
        };
        let err = evolution_handler(State(state), Path(1)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_store() {
        let state = charmander_state();
        let handles: Vec<_> = [4, 5, 6, 4, 5, 6]
            .into_iter()
            .map(|id| {
                let state = state.clone();
                tokio::spawn(async move { resolve(&state, id).await.map(|r| r.chain) })
            })
            .collect();
        let mut outputs = Vec::new();
        for handle in handles {
            let chain = handle.await.unwrap().unwrap();
            outputs.push(chain.species_ids());
        }
        assert!(outputs.iter().all(|ids| ids == &vec![4, 5, 6]));
    }

    #[test]
    fn cli_flags_override_prefs() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from([
            "dexd",
            "--config-dir",
            dir.path().to_str().unwrap(),
            "--bind",
            "0.0.0.0:9000",
            "--max-depth",
            "3",
        ]);
        let prefs = load_prefs(&args);
        assert_eq!(prefs.bind, "0.0.0.0:9000");
        assert_eq!(prefs.resolver.max_depth, 3);
        assert!(dir.path().join("dexd.json").exists());
    }
}
