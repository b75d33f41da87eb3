// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - upstream clients and shared in-memory state.

pub mod activity;
pub mod auth;
pub mod backend;

pub use activity::RecentPunches;
pub use auth::AuthClient;
pub use backend::BackendClient;
