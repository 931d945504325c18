// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for Dex tools (config port, service prefs).
//! Keeps the daemon and CLI thin and storage-agnostic.

pub mod config;
pub mod prefs;
