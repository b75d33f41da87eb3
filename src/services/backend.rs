// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Loyalty API client.
//!
//! Handles:
//! - Customer card listing
//! - Role resolution via the profile endpoint
//! - Merchant program listing (normalized) and public program lookup
//! - Punch and redemption submission
//! - Wallet pass relay (Apple `.pkpass` bytes, Google save URL)

use crate::error::AppError;
use crate::models::card::decode_cards;
use crate::models::pass::{pass_filename, ApplePass, GoogleSaveResponse};
use crate::models::{normalize_merchant_programs, NormalizedPrograms, Program, PunchCard, UserRole};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const PKPASS_MIME: &str = "application/vnd.apple.pkpass";

/// Loyalty API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CardsResponse {
    #[serde(default)]
    cards: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    role: Option<String>,
}

/// Result of a punch submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PunchResult {
    /// Punches still needed after this one; absent or 0 once complete
    #[serde(default)]
    pub remaining: Option<u32>,
}

impl PunchResult {
    /// Banner text shown to the merchant.
    pub fn banner(&self) -> String {
        match self.remaining {
            Some(n) if n > 0 => format!("✓ Punch added! {n} more needed."),
            _ => "✓ Punch added! Card complete!".to_string(),
        }
    }
}

impl BackendClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// All of the signed-in customer's cards, unfiltered.
    pub async fn get_user_cards(&self, access_token: &str) -> Result<Vec<PunchCard>, AppError> {
        let url = format!("{}/api/user/cards", self.base_url);
        let response: CardsResponse = self.get_json(&url, Some(access_token), &[]).await?;
        Ok(decode_cards(response.cards))
    }

    /// Resolve whether the signed-in user is a merchant or a customer.
    pub async fn get_user_role(&self, access_token: &str) -> Result<UserRole, AppError> {
        let url = format!("{}/api/user/profile", self.base_url);
        let profile: ProfileResponse = self.get_json(&url, Some(access_token), &[]).await?;
        Ok(UserRole::from_profile(profile.role.as_deref()))
    }

    /// Programs owned by the signed-in merchant user.
    pub async fn get_merchant_programs(
        &self,
        access_token: &str,
    ) -> Result<NormalizedPrograms, AppError> {
        let url = format!("{}/api/program/merchant_user_programs", self.base_url);
        let payload: serde_json::Value = self.get_json(&url, Some(access_token), &[]).await?;
        let normalized = normalize_merchant_programs(&payload);

        tracing::debug!(
            programs = normalized.programs.len(),
            merchants = normalized.groups.len(),
            "Loaded merchant programs"
        );

        Ok(normalized)
    }

    /// Public program lookup (no authentication).
    pub async fn get_program(&self, program_id: &str) -> Result<Program, AppError> {
        let url = format!("{}/api/program/get_program", self.base_url);
        self.get_json(&url, None, &[("program_id", program_id)])
            .await
    }

    /// Add one punch to `card_id`.
    pub async fn punch_card(
        &self,
        access_token: &str,
        card_id: &str,
    ) -> Result<PunchResult, AppError> {
        let url = format!("{}/api/passes/punch_card", self.base_url);
        let result: PunchResult = self
            .get_json(&url, Some(access_token), &[("card_id", card_id)])
            .await?;

        tracing::info!(card_id, remaining = ?result.remaining, "Punch submitted");
        Ok(result)
    }

    /// Redeem the reward on `card_id` on behalf of staff member `staff_id`.
    pub async fn redeem_reward(
        &self,
        access_token: &str,
        staff_id: &str,
        card_id: &str,
    ) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/api/redemptions/redeem_reward", self.base_url);
        let result = self
            .get_json(
                &url,
                Some(access_token),
                &[("staff_id", staff_id), ("card_id", card_id)],
            )
            .await?;

        tracing::info!(card_id, staff_id, "Redemption submitted");
        Ok(result)
    }

    /// Fetch (or have the backend issue) the Apple Wallet pass for a program.
    pub async fn apple_pass(
        &self,
        access_token: &str,
        program_id: &str,
        merchant_name: &str,
    ) -> Result<ApplePass, AppError> {
        let url = format!("{}/api/passes/apple/get_or_create/", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .header(ACCEPT, PKPASS_MIME)
            .query(&[("program_id", program_id)])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_response(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to read pass body: {e}")))?;

        Ok(ApplePass {
            bytes: bytes.to_vec(),
            filename: pass_filename(merchant_name),
        })
    }

    /// Google Wallet "save" link for a program.
    pub async fn google_pass_url(
        &self,
        access_token: &str,
        program_id: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/api/passes/google/get_or_create/", self.base_url);
        let response: GoogleSaveResponse = self
            .get_json(&url, Some(access_token), &[("program_id", program_id)])
            .await?;

        response
            .save_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::Backend {
                status: 502,
                message: "No Google Wallet save URL returned".to_string(),
            })
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(network_error)?;
        let response = check_response(response).await?;

        response.json().await.map_err(|e| AppError::Backend {
            status: 502,
            message: format!("JSON parse error: {e}"),
        })
    }
}

fn network_error(e: reqwest::Error) -> AppError {
    tracing::warn!(error = %e, "Loyalty API request failed");
    AppError::Backend {
        status: 503,
        message: e.to_string(),
    }
}

/// Pass successful responses through; classify everything else.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    tracing::warn!(status, "Loyalty API returned an error");
    Err(AppError::from_status(status, &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punch_banner() {
        assert_eq!(
            PunchResult { remaining: Some(3) }.banner(),
            "✓ Punch added! 3 more needed."
        );
        assert_eq!(
            PunchResult { remaining: Some(0) }.banner(),
            "✓ Punch added! Card complete!"
        );
        assert_eq!(
            PunchResult::default().banner(),
            "✓ Punch added! Card complete!"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = BackendClient::new("http://api.local/");
        assert_eq!(client.base_url, "http://api.local");
    }
}
