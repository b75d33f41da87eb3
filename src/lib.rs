// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PushCard Web: customer and merchant frontend for digital punch cards
//!
//! This crate renders the wallet, join, card and merchant pages and relays
//! every loyalty operation to the external loyalty API.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use config::Config;
use services::{AuthClient, BackendClient, RecentPunches};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub auth: AuthClient,
    pub recent_punches: RecentPunches,
}

impl AppState {
    /// Build clients for the upstreams named in `config`.
    pub fn new(config: Config) -> Self {
        let backend = BackendClient::new(config.api_url.clone());
        let auth = AuthClient::new(config.supabase_url.clone(), config.supabase_anon_key.clone());
        Self {
            config,
            backend,
            auth,
            recent_punches: RecentPunches::new(),
        }
    }
}
