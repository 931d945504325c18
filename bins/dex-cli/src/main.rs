// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dex CLI
//!
//! Resolves evolution chains from a JSON dataset and prints them as JSON.
//! Resolution diagnostics go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dex_evolution::{MemoryStore, Resolver, ResolverOptions, SpeciesId, DEFAULT_MAX_DEPTH};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command to execute
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Resolve the evolution chain containing a species
    Resolve {
        /// JSON dataset (`species` and `edges` arrays)
        #[arg(long)]
        dataset: PathBuf,
        /// Species id to resolve
        id: SpeciesId,
        /// Print only the pre-evolution and direct evolutions
        #[arg(long)]
        links: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
        /// Maximum chain depth before truncation
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
        /// Separator between requirement clauses
        #[arg(long, default_value = dex_evolution::DEFAULT_SEPARATOR)]
        separator: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    match args.cmd {
        Command::Resolve {
            dataset,
            id,
            links,
            pretty,
            max_depth,
            separator,
        } => {
            let store = MemoryStore::from_path(&dataset)
                .with_context(|| format!("load dataset {}", dataset.display()))?;
            info!(
                species = store.species_count(),
                chains = store.chain_count(),
                "dataset loaded"
            );
            let resolver = Resolver::new(ResolverOptions {
                max_depth,
                clause_separator: separator,
            });
            let resolution = resolver.resolve(&store, id)?;
            if links {
                emit(&resolution.links(id).unwrap_or_default(), pretty)
            } else {
                emit(&resolution.chain, pretty)
            }
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
