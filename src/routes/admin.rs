// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin scan console.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use super::merchant::{session_expired, submit_punch};
use crate::middleware::Session;
use crate::views::{pages, Banner};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/scan", post(scan))
}

fn render(state: &AppState, session: &Session, banner: Option<&Banner>) -> Html<String> {
    let recent = state.recent_punches.list(&session.user_id);
    pages::admin_dashboard(session, &recent, Utc::now(), banner)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    if let Some(redirect) = session.guard_admin() {
        return redirect.into_response();
    }
    render(&state, &session, None).into_response()
}

#[derive(Deserialize)]
struct ScanForm {
    #[serde(default)]
    payload: String,
}

async fn scan(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Form(form): Form<ScanForm>,
) -> Response {
    if let Some(redirect) = session.guard_admin() {
        return redirect.into_response();
    }

    let banner = match submit_punch(&state, &session, &form.payload).await {
        Ok(banner) => banner,
        Err(e) if e.is_unauthorized() => return session_expired(jar, &state, "/admin"),
        Err(e) => {
            tracing::info!(user_id = %session.user_id, error = %e, "Admin scan failed");
            Banner::error(e.user_message())
        }
    };

    render(&state, &session, Some(&banner)).into_response()
}
