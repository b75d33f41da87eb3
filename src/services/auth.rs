// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted auth provider client (Supabase GoTrue REST API).
//!
//! Credentials never stay on this server: sign-in and sign-up hand back a
//! provider session whose access token is then carried in the session
//! cookie and forwarded to the loyalty API as a bearer token.

use crate::error::AppError;
use crate::models::User;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Provider session returned by sign-in, sign-up and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Outcome of a sign-up call.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Auto-confirmed account, signed in immediately
    SignedIn(AuthSession),
    /// Account created; the user must confirm via e-mail first
    ConfirmationRequired,
}

/// Profile fields stored as user metadata at sign-up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
}

/// Auth provider client.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(supabase_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let supabase_url = supabase_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.into(),
        }
    }

    /// Password sign-in.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        let session: AuthSession = parse_json(response).await?;
        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(network_error)?;

        parse_json(response).await
    }

    /// Create an account with profile metadata.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: &SignUpProfile,
    ) -> Result<SignUpOutcome, AppError> {
        let response = self
            .http
            .post(format!("{}/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password, "data": profile }))
            .send()
            .await
            .map_err(network_error)?;

        let body: serde_json::Value = parse_json(response).await?;

        // Auto-confirmed projects answer with a full session; otherwise a bare user.
        if body.get("access_token").is_some() {
            let session: AuthSession = serde_json::from_value(body).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Malformed sign-up session: {e}"))
            })?;
            tracing::info!(user_id = %session.user.id, "User signed up");
            Ok(SignUpOutcome::SignedIn(session))
        } else {
            tracing::info!("User signed up, confirmation pending");
            Ok(SignUpOutcome::ConfirmationRequired)
        }
    }

    /// Revoke the provider session. Best effort.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).await
    }

    /// Send a password recovery e-mail linking back to `redirect_to`.
    pub async fn recover_password(&self, email: &str, redirect_to: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/recover", self.base_url))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).await?;
        tracing::info!("Password recovery requested");
        Ok(())
    }

    /// Set a new password for the user owning `access_token`.
    pub async fn update_password(&self, access_token: &str, password: &str) -> Result<(), AppError> {
        let response = self
            .http
            .put(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        check_status(response).await
    }

    /// Exchange the `token_hash` from a recovery e-mail for a session.
    pub async fn verify_recovery(&self, token_hash: &str) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(format!("{}/verify", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&json!({ "type": "recovery", "token_hash": token_hash }))
            .send()
            .await
            .map_err(network_error)?;

        parse_json(response).await
    }
}

fn network_error(e: reqwest::Error) -> AppError {
    tracing::warn!(error = %e, "Auth provider request failed");
    AppError::AuthProvider {
        status: 503,
        message: e.to_string(),
    }
}

async fn provider_error(response: reqwest::Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AppError::AuthProvider {
        status,
        message: provider_message(&body),
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(provider_error(response).await)
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        return Err(provider_error(response).await);
    }

    response.json().await.map_err(|e| AppError::AuthProvider {
        status: 502,
        message: format!("JSON parse error: {e}"),
    })
}

/// GoTrue puts the readable text in different fields per endpoint.
fn provider_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    body.trim().to_string()
}

/// Map a sign-up failure to the text shown on the form.
pub fn sign_up_error_message(err: &AppError) -> String {
    let (status, message) = match err {
        AppError::AuthProvider { status, message } => (Some(*status), message.as_str()),
        AppError::BadRequest(message) => (None, message.as_str()),
        _ => (None, ""),
    };
    let lower = message.to_lowercase();

    if matches_in_order(&lower, "user", &["registered", "exists"]) {
        return "This email is already registered. Try signing in instead.".to_string();
    }
    if matches_in_order(&lower, "password", &["at least", "too short", "6"]) || status == Some(422)
    {
        return "Password must be at least 6 characters.".to_string();
    }
    if matches_in_order(&lower, "email", &["invalid"]) {
        return "Please enter a valid email address.".to_string();
    }
    if status == Some(429) || lower.contains("too many") {
        return "Too many attempts. Please wait a minute and try again.".to_string();
    }

    if message.trim().is_empty() || status.is_some_and(|s| s >= 500) {
        "Unable to sign up. Please try again.".to_string()
    } else {
        message.to_string()
    }
}

/// `head` occurs, followed later by any of `tails`.
fn matches_in_order(text: &str, head: &str, tails: &[&str]) -> bool {
    text.find(head)
        .map(|idx| &text[idx + head.len()..])
        .is_some_and(|rest| tails.iter().any(|t| rest.contains(t)))
}
