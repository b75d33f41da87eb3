// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wallet pass relay types and scanner payloads.

use crate::error::AppError;
use serde::Deserialize;

/// A `.pkpass` relayed from the backend.
#[derive(Debug, Clone)]
pub struct ApplePass {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Google Wallet response from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSaveResponse {
    #[serde(default)]
    pub save_url: Option<String>,
}

/// Download name for an Apple pass, e.g. `Brew-&-Bean-loyalty-card.pkpass`.
pub fn pass_filename(merchant_name: &str) -> String {
    let name = merchant_name.split_whitespace().collect::<Vec<_>>().join("-");
    let name = if name.is_empty() { "Merchant" } else { &name };
    format!("{name}-loyalty-card.pkpass")
}

/// Parsed contents of a scanned QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPayload {
    pub card_id: String,
    pub customer_id: Option<String>,
}

impl ScanPayload {
    /// Accepts `pushcard://punch/<card>`, `pushcard://customer/<c>/card/<card>`
    /// or a raw card id.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::BadRequest("Invalid QR code".to_string()));
        }

        let Some(path) = raw.strip_prefix("pushcard://") else {
            return Ok(Self {
                card_id: raw.to_string(),
                customer_id: None,
            });
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["punch", card_id] => Ok(Self {
                card_id: card_id.to_string(),
                customer_id: None,
            }),
            ["customer", customer_id, "card", card_id] => Ok(Self {
                card_id: card_id.to_string(),
                customer_id: Some(customer_id.to_string()),
            }),
            _ => Err(AppError::BadRequest("Invalid QR code".to_string())),
        }
    }
}
