// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Program join landing: the page a merchant's QR code points at.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::auth::establish_session;
use super::{current_session, validation_message};
use crate::error::Result;
use crate::middleware::Session;
use crate::models::card::card_for_program;
use crate::models::user::split_full_name;
use crate::models::{reconcile_expired, BrandPalette, Program, UserRole};
use crate::services::auth::{sign_up_error_message, SignUpOutcome, SignUpProfile};
use crate::views::pages::{self, JoinPanel};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/join/{program_id}", get(join_page).post(join_signup))
}

fn render(program: &Program, panel: &JoinPanel) -> Html<String> {
    let palette = BrandPalette::from_brand_color(program.brand_color.as_deref());
    pages::join(program, &palette, panel)
}

/// What a signed-in visitor sees for `program`.
async fn member_panel(state: &AppState, session: &Session, program: &Program) -> JoinPanel {
    if session.role == UserRole::Merchant {
        return JoinPanel::Merchant;
    }

    match state.backend.get_user_cards(&session.access_token).await {
        Ok(cards) => match card_for_program(&reconcile_expired(cards), &program.id) {
            Some(card) => JoinPanel::ExistingCard(card.clone()),
            None => JoinPanel::Preview,
        },
        Err(e) => {
            tracing::warn!(user_id = %session.user_id, error = %e, "Card lookup failed on join page");
            JoinPanel::Preview
        }
    }
}

async fn join_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(program_id): Path<String>,
) -> Result<Html<String>> {
    let program = state.backend.get_program(&program_id).await?;

    let panel = match current_session(&jar, &state) {
        Some(session) => member_panel(&state, &session, &program).await,
        None => JoinPanel::SignUp {
            name: String::new(),
            email: String::new(),
            error: None,
        },
    };

    Ok(render(&program, &panel))
}

#[derive(Deserialize, Validate)]
struct JoinForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in name, email and password"))]
    name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in name, email and password"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in name, email and password"))]
    password: String,
}

/// Inline sign-up, then back to the join page as a member.
async fn join_signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(program_id): Path<String>,
    Form(mut form): Form<JoinForm>,
) -> Result<Response> {
    let program = state.backend.get_program(&program_id).await?;
    form.name = form.name.trim().to_string();
    form.email = form.email.trim().to_string();

    let retry = |error: String| {
        render(
            &program,
            &JoinPanel::SignUp {
                name: form.name.clone(),
                email: form.email.clone(),
                error: Some(error),
            },
        )
        .into_response()
    };

    if let Err(errors) = form.validate() {
        let message = validation_message(&errors, &["name", "email", "password"]).unwrap_or_default();
        return Ok(retry(message));
    }

    let (first_name, last_name) = split_full_name(&form.name);
    let profile = SignUpProfile {
        first_name: Some(first_name),
        last_name: Some(last_name).filter(|l| !l.is_empty()),
        birthdate: None,
    };

    match state.auth.sign_up(&form.email, &form.password, &profile).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            let (jar, _) = establish_session(&state, jar, &session).await?;
            tracing::info!(user_id = %session.user.id, program_id = %program.id, "Joined from program page");
            let target = format!("/join/{}", urlencoding::encode(&program.id));
            Ok((jar, Redirect::to(&target)).into_response())
        }
        Ok(SignUpOutcome::ConfirmationRequired) => {
            Ok(render(&program, &JoinPanel::ConfirmEmail).into_response())
        }
        Err(e) => {
            tracing::info!(program_id = %program.id, error = %e, "Join sign-up rejected");
            Ok(retry(sign_up_error_message(&e)))
        }
    }
}
