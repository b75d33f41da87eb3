// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Punch card model and display-time derivations.

use serde::{Deserialize, Serialize};

/// Card lifecycle state as reported by the loyalty API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Completed,
    Expired,
    #[serde(other)]
    Unknown,
}

/// A customer's card for one program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchCard {
    pub id: String,
    pub program_id: String,
    #[serde(default)]
    pub merchant_name: String,
    #[serde(default)]
    pub merchant_logo_url: Option<String>,
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub current_punches: u32,
    #[serde(default)]
    pub punches_required: u32,
    #[serde(default)]
    pub reward_credits: u32,
    #[serde(default = "default_status")]
    pub status: CardStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_punched_at: Option<String>,
    #[serde(default)]
    pub reward_description: Option<String>,
    #[serde(default)]
    pub wallet_brand_color: Option<String>,
    #[serde(default)]
    pub foreground_color: Option<String>,
}

fn default_status() -> CardStatus {
    CardStatus::Active
}

/// Visual tier used for the card detail gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTier {
    Gold,
    PurpleBlue,
    Rainbow,
}

impl CardTier {
    pub fn css_class(self) -> &'static str {
        match self {
            CardTier::Gold => "gradient-gold",
            CardTier::PurpleBlue => "gradient-purple-blue",
            CardTier::Rainbow => "gradient-rainbow",
        }
    }
}

pub const DEFAULT_CARD_BACKGROUND: &str =
    "linear-gradient(135deg, rgba(79, 70, 229, 0.9), rgba(124, 58, 237, 0.9))";
pub const DEFAULT_CARD_FOREGROUND: &str = "#ffffff";

impl PunchCard {
    /// Punches still needed; negative when the backend over-punched.
    pub fn punches_remaining(&self) -> i64 {
        i64::from(self.punches_required) - i64::from(self.current_punches)
    }

    pub fn is_complete(&self) -> bool {
        self.punches_remaining() <= 0
    }

    pub fn is_near_complete(&self) -> bool {
        (1..=2).contains(&self.punches_remaining())
    }

    pub fn is_expired(&self) -> bool {
        self.status == CardStatus::Expired
    }

    pub fn tier(&self) -> CardTier {
        if self.is_complete() {
            CardTier::Gold
        } else if self.is_near_complete() {
            CardTier::PurpleBlue
        } else {
            CardTier::Rainbow
        }
    }

    /// Completion percentage, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_punches, self.punches_required)
    }

    /// First eight characters of the id, as printed on the card face.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// "READY" once complete, otherwise the remaining punch count.
    pub fn balance_label(&self) -> String {
        if self.is_complete() {
            "READY".to_string()
        } else {
            self.punches_remaining().to_string()
        }
    }

    pub fn background(&self) -> &str {
        self.wallet_brand_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CARD_BACKGROUND)
    }

    pub fn foreground(&self) -> &str {
        self.foreground_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CARD_FOREGROUND)
    }

    /// Headline for the card detail page while punches remain.
    pub fn remaining_headline(&self) -> String {
        let remaining = self.punches_remaining();
        if self.is_near_complete() {
            let noun = if remaining == 1 { "punch" } else { "punches" };
            format!("Almost there! {remaining} more {noun}")
        } else {
            format!("{remaining} punches to go")
        }
    }

    /// QR payload a merchant scans to punch this card.
    pub fn qr_value(&self) -> String {
        format!("pushcard://punch/{}", self.id)
    }

    /// "Member since" date, falling back to the raw timestamp.
    pub fn member_since(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

pub fn progress_percent(current: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(current) / f64::from(total) * 100.0).min(100.0)
}

/// Hide expired cards that have been superseded.
///
/// An expired card is dropped when another card for the same program is
/// not expired. Order is preserved.
pub fn reconcile_expired(cards: Vec<PunchCard>) -> Vec<PunchCard> {
    let superseded: Vec<bool> = cards
        .iter()
        .map(|card| {
            card.is_expired()
                && cards.iter().any(|other| {
                    other.program_id == card.program_id
                        && !other.is_expired()
                        && other.id != card.id
                })
        })
        .collect();

    cards
        .into_iter()
        .zip(superseded)
        .filter_map(|(card, hidden)| (!hidden).then_some(card))
        .collect()
}

/// Decode a card list, skipping entries that do not parse.
pub fn decode_cards(items: Vec<serde_json::Value>) -> Vec<PunchCard> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(card) => Some(card),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable card");
                None
            }
        })
        .collect()
}

/// The card a customer already holds for `program_id`, if any.
pub fn card_for_program<'a>(cards: &'a [PunchCard], program_id: &str) -> Option<&'a PunchCard> {
    cards.iter().find(|c| c.program_id == program_id)
}
