// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer wallet routes.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::Session;
use crate::models::{reconcile_expired, PunchCard};
use crate::views::pages;
use crate::AppState;

const PKPASS_MIME: &str = "application/vnd.apple.pkpass";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallet", get(wallet))
        .route("/card/{card_id}", get(card_detail))
        .route("/wallet/pass/apple", get(apple_pass))
        .route("/wallet/pass/google", get(google_pass))
}

/// List the customer's cards, hiding superseded expired ones.
async fn wallet(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Html<String>> {
    let cards = state.backend.get_user_cards(&session.access_token).await?;
    let total = cards.len();
    let cards = reconcile_expired(cards);

    tracing::debug!(
        user_id = %session.user_id,
        total,
        visible = cards.len(),
        "Loaded wallet"
    );

    Ok(pages::wallet(&session, &cards, &state.config.feedback_email))
}

async fn find_card(state: &AppState, session: &Session, card_id: &str) -> Result<PunchCard> {
    state
        .backend
        .get_user_cards(&session.access_token)
        .await?
        .into_iter()
        .find(|c| c.id == card_id)
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
}

async fn card_detail(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(card_id): Path<String>,
) -> Result<Html<String>> {
    let card = find_card(&state, &session, &card_id).await?;
    Ok(pages::card_detail(&session, &card))
}

#[derive(Deserialize)]
struct PassQuery {
    #[serde(default)]
    program_id: String,
}

fn require_program_id(query: &PassQuery) -> Result<&str> {
    let program_id = query.program_id.trim();
    if program_id.is_empty() {
        return Err(AppError::BadRequest("Missing program".to_string()));
    }
    Ok(program_id)
}

/// Relay the Apple Wallet pass as a download.
async fn apple_pass(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<PassQuery>,
) -> Result<Response> {
    let program_id = require_program_id(&query)?;

    // The pass file is named after the merchant on the customer's card.
    let merchant_name = state
        .backend
        .get_user_cards(&session.access_token)
        .await
        .ok()
        .and_then(|cards| {
            cards
                .into_iter()
                .find(|c| c.program_id == program_id)
                .map(|c| c.merchant_name)
        })
        .unwrap_or_default();

    let pass = state
        .backend
        .apple_pass(&session.access_token, program_id, &merchant_name)
        .await?;

    tracing::info!(
        user_id = %session.user_id,
        program_id,
        bytes = pass.bytes.len(),
        "Apple pass relayed"
    );

    Ok((
        [
            (header::CONTENT_TYPE, PKPASS_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pass.filename.replace('"', "")),
            ),
        ],
        pass.bytes,
    )
        .into_response())
}

/// Send the customer to Google's save page.
async fn google_pass(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<PassQuery>,
) -> Result<Redirect> {
    let program_id = require_program_id(&query)?;
    let save_url = state
        .backend
        .google_pass_url(&session.access_token, program_id)
        .await?;

    tracing::info!(user_id = %session.user_id, program_id, "Google pass link issued");
    Ok(Redirect::to(&save_url))
}
