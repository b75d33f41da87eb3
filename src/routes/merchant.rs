// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merchant dashboard: programs, punches and redemptions.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::session::end_session;
use crate::middleware::Session;
use crate::models::ScanPayload;
use crate::services::activity::PunchRecord;
use crate::views::pages;
use crate::views::Banner;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/merchant", get(dashboard))
        .route("/merchant/punch", post(punch))
        .route("/merchant/redeem", get(redeem_confirm).post(redeem))
}

/// Render the dashboard with a fresh program list.
async fn render_dashboard(state: &AppState, session: &Session, banner: Option<Banner>) -> Html<String> {
    match state.backend.get_merchant_programs(&session.access_token).await {
        Ok(programs) => pages::merchant_dashboard(session, Some(&programs), banner.as_ref()),
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "Failed to load merchant programs");
            let banner = banner.unwrap_or_else(|| Banner::error(e.user_message()));
            pages::merchant_dashboard(session, None, Some(&banner))
        }
    }
}

/// Clear the session and send the user to sign in again.
pub(crate) fn session_expired(jar: CookieJar, state: &AppState, next: &str) -> Response {
    let target = format!("/login?next={}", urlencoding::encode(next));
    (end_session(jar, &state.config), Redirect::to(&target)).into_response()
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Response {
    if let Some(redirect) = session.guard_merchant() {
        return redirect.into_response();
    }
    render_dashboard(&state, &session, None).await.into_response()
}

#[derive(Deserialize)]
struct ScanForm {
    #[serde(default)]
    card_id: String,
}

/// Submit a punch for a scanned card and record it for the activity list.
pub(crate) async fn submit_punch(
    state: &AppState,
    session: &Session,
    raw: &str,
) -> Result<Banner, AppError> {
    let scan = ScanPayload::parse(raw)?;
    let result = state
        .backend
        .punch_card(&session.access_token, &scan.card_id)
        .await?;

    state.recent_punches.record(
        &session.user_id,
        PunchRecord {
            card_id: scan.card_id,
            customer_id: scan.customer_id,
            remaining: result.remaining,
            punched_at: Utc::now(),
        },
    );

    Ok(Banner::success(result.banner()))
}

async fn punch(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Form(form): Form<ScanForm>,
) -> Response {
    if let Some(redirect) = session.guard_merchant() {
        return redirect.into_response();
    }

    let banner = match submit_punch(&state, &session, &form.card_id).await {
        Ok(banner) => banner,
        Err(e) if e.is_unauthorized() => return session_expired(jar, &state, "/merchant"),
        Err(e) => {
            tracing::info!(user_id = %session.user_id, error = %e, "Punch failed");
            Banner::error(e.user_message())
        }
    };

    render_dashboard(&state, &session, Some(banner)).await.into_response()
}

#[derive(Deserialize)]
struct RedeemQuery {
    #[serde(default)]
    card_id: String,
}

/// Confirmation step before a redemption.
async fn redeem_confirm(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<RedeemQuery>,
) -> Response {
    if let Some(redirect) = session.guard_merchant() {
        return redirect.into_response();
    }

    match ScanPayload::parse(&query.card_id) {
        Ok(scan) => pages::redeem_confirm(&session, &scan.card_id).into_response(),
        Err(e) => render_dashboard(&state, &session, Some(Banner::error(e.user_message())))
            .await
            .into_response(),
    }
}

async fn redeem(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Form(form): Form<ScanForm>,
) -> Response {
    if let Some(redirect) = session.guard_merchant() {
        return redirect.into_response();
    }

    let outcome = match ScanPayload::parse(&form.card_id) {
        Ok(scan) => state
            .backend
            .redeem_reward(&session.access_token, &session.user_id, &scan.card_id)
            .await
            .map(|_| ()),
        Err(e) => Err(e),
    };

    let banner = match outcome {
        Ok(()) => Banner::success("Reward redeemed!"),
        Err(e) if e.is_unauthorized() => return session_expired(jar, &state, "/merchant"),
        Err(e) => {
            tracing::info!(user_id = %session.user_id, error = %e, "Redemption failed");
            Banner::error(e.user_message())
        }
    };

    render_dashboard(&state, &session, Some(banner)).await.into_response()
}
