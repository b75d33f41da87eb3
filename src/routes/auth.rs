// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: sign in, sign up, password reset and sign out.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use validator::{Validate, ValidationError};

use super::{current_session, validation_message};
use crate::error::Result;
use crate::middleware::session::{claims_for, end_session, safe_next_path, session_claims, start_session};
use crate::models::UserRole;
use crate::services::auth::{sign_up_error_message, AuthSession, SignUpOutcome, SignUpProfile};
use crate::views::pages::{self, LoginView, SignupView};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", get(reset_password_page).post(reset_password))
        .route("/logout", post(logout))
}

const CONFIRM_EMAIL: &str = "Check your email to confirm your account, then sign in.";
const RESET_LINK_SENT: &str = "Reset link sent. Check your email.";
const PASSWORD_UPDATED: &str = "Password updated. You can sign in with your new password.";
const INVALID_RESET_LINK: &str =
    "Your reset link is invalid or has expired. Request a new one from the sign-in page.";

/// Resolve the role, store the session cookie and pick the landing page.
///
/// A failed role lookup falls back to the customer experience.
pub(crate) async fn establish_session(
    state: &AppState,
    jar: CookieJar,
    session: &AuthSession,
) -> Result<(CookieJar, UserRole)> {
    let role = match state.backend.get_user_role(&session.access_token).await {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(user_id = %session.user.id, error = %e, "Role lookup failed, assuming customer");
            UserRole::Customer
        }
    };

    let claims = claims_for(session, role, &state.config)?;
    let jar = start_session(jar, &claims, &state.config)?;
    tracing::info!(user_id = %claims.sub, role = ?role, admin = claims.admin, "Session started");
    Ok((jar, role))
}

// ─── Sign in ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

async fn login_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    if let Some(session) = current_session(&jar, &state) {
        let target = safe_next_path(query.next.as_deref()).unwrap_or(session.role.home_path());
        return Redirect::to(target).into_response();
    }

    pages::login(&LoginView {
        next: safe_next_path(query.next.as_deref()).map(str::to_string),
        ..Default::default()
    })
    .into_response()
}

#[derive(Deserialize, Validate)]
struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all required fields"))]
    password: String,
    next: Option<String>,
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> Result<Response> {
    form.email = form.email.trim().to_string();
    let email = form.email.clone();
    let next = safe_next_path(form.next.as_deref()).map(str::to_string);
    let retry = |error: String| {
        pages::login(&LoginView {
            email: email.clone(),
            next: next.clone(),
            error: Some(error),
            info: None,
        })
        .into_response()
    };

    if let Err(errors) = form.validate() {
        let message = validation_message(&errors, &["email", "password"]).unwrap_or_default();
        return Ok(retry(message));
    }

    let session = match state.auth.sign_in(&email, &form.password).await {
        Ok(session) => session,
        Err(e) => {
            tracing::info!(error = %e, "Sign-in rejected");
            return Ok(retry(e.user_message()));
        }
    };

    let (jar, role) = establish_session(&state, jar, &session).await?;
    let target = next.as_deref().unwrap_or(role.home_path());
    Ok((jar, Redirect::to(target)).into_response())
}

// ─── Sign up ─────────────────────────────────────────────────

async fn signup_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    match current_session(&jar, &state) {
        Some(session) => Redirect::to(session.role.home_path()).into_response(),
        None => pages::signup(&SignupView::default()).into_response(),
    }
}

#[derive(Deserialize, Validate)]
struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    last_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    birthdate: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please fill in all fields"))]
    password: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(mut form): Form<SignupForm>,
) -> Result<Response> {
    for field in [
        &mut form.first_name,
        &mut form.last_name,
        &mut form.birthdate,
        &mut form.email,
    ] {
        *field = field.trim().to_string();
    }
    let mut view = SignupView {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        birthdate: form.birthdate.clone(),
        email: form.email.clone(),
        ..Default::default()
    };

    if let Err(errors) = form.validate() {
        view.error = validation_message(
            &errors,
            &["first_name", "last_name", "birthdate", "email", "password"],
        );
        return Ok(pages::signup(&view).into_response());
    }

    let profile = SignUpProfile {
        first_name: Some(view.first_name.clone()),
        last_name: Some(view.last_name.clone()),
        birthdate: Some(view.birthdate.clone()),
    };

    match state.auth.sign_up(&view.email, &form.password, &profile).await {
        Ok(SignUpOutcome::SignedIn(session)) => {
            let (jar, role) = establish_session(&state, jar, &session).await?;
            Ok((jar, Redirect::to(role.home_path())).into_response())
        }
        Ok(SignUpOutcome::ConfirmationRequired) => Ok(pages::login(&LoginView {
            email: view.email,
            info: Some(CONFIRM_EMAIL.to_string()),
            ..Default::default()
        })
        .into_response()),
        Err(e) => {
            tracing::info!(error = %e, "Sign-up rejected");
            view.error = Some(sign_up_error_message(&e));
            Ok(pages::signup(&view).into_response())
        }
    }
}

// ─── Password reset ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct ForgotPasswordForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Enter your email to reset your password"),
        email(message = "Please enter a valid email address")
    )]
    email: String,
    next: Option<String>,
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Form(mut form): Form<ForgotPasswordForm>,
) -> Html<String> {
    form.email = form.email.trim().to_string();
    let mut view = LoginView {
        email: form.email.clone(),
        next: safe_next_path(form.next.as_deref()).map(str::to_string),
        ..Default::default()
    };

    if let Err(errors) = form.validate() {
        view.error = validation_message(&errors, &["email"]);
        return pages::login(&view);
    }

    let redirect_to = format!("{}/reset-password", state.config.public_url);
    match state.auth.recover_password(&form.email, &redirect_to).await {
        Ok(()) => view.info = Some(RESET_LINK_SENT.to_string()),
        Err(e) => view.error = Some(e.user_message()),
    }
    pages::login(&view)
}

/// The recovery e-mail links here with `token_hash` (and `type=recovery`).
#[derive(Deserialize)]
struct ResetQuery {
    token_hash: Option<String>,
}

async fn reset_password_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ResetQuery>,
) -> Result<Response> {
    let Some(token_hash) = query.token_hash.filter(|t| !t.is_empty()) else {
        let error = session_claims(&jar, &state.config)
            .is_none()
            .then_some(INVALID_RESET_LINK);
        return Ok(pages::reset_password(error, None).into_response());
    };

    match state.auth.verify_recovery(&token_hash).await {
        Ok(session) => {
            let (jar, _) = establish_session(&state, jar, &session).await?;
            Ok((jar, pages::reset_password(None, None)).into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Recovery link rejected");
            Ok(pages::reset_password(Some(INVALID_RESET_LINK), None).into_response())
        }
    }
}

fn check_new_password(form: &ResetPasswordForm) -> std::result::Result<(), ValidationError> {
    let fail = |message: &'static str| {
        Err(ValidationError::new("password").with_message(Cow::Borrowed(message)))
    };
    if form.password.is_empty() || form.confirm.is_empty() {
        return fail("Please fill in all fields");
    }
    if form.password.chars().count() < 6 {
        return fail("Password must be at least 6 characters");
    }
    if form.password != form.confirm {
        return fail("Passwords do not match");
    }
    Ok(())
}

#[derive(Deserialize, Validate)]
#[validate(schema(function = "check_new_password"))]
struct ResetPasswordForm {
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm: String,
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Html<String> {
    if let Err(errors) = form.validate() {
        let message = validation_message(&errors, &["__all__"]);
        return pages::reset_password(message.as_deref(), None);
    }

    let Some(claims) = session_claims(&jar, &state.config) else {
        return pages::reset_password(Some(INVALID_RESET_LINK), None);
    };

    match state.auth.update_password(&claims.access_token, &form.password).await {
        Ok(()) => {
            tracing::info!(user_id = %claims.sub, "Password updated");
            pages::reset_password(None, Some(PASSWORD_UPDATED))
        }
        Err(e) => pages::reset_password(Some(&e.user_message()), None),
    }
}

// ─── Sign out ────────────────────────────────────────────────

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(claims) = session_claims(&jar, &state.config) {
        if let Err(e) = state.auth.sign_out(&claims.access_token).await {
            tracing::debug!(user_id = %claims.sub, error = %e, "Provider sign-out failed");
        }
        tracing::info!(user_id = %claims.sub, "User signed out");
    }

    (end_session(jar, &state.config), Redirect::to("/"))
}
