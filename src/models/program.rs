// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Loyalty program model and merchant-programs normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A merchant-defined loyalty scheme, as returned by the loyalty API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub punches_required: u32,
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_logo_url: Option<String>,
    #[serde(default)]
    pub reward_description: Option<String>,
    #[serde(default)]
    pub expires_after_days: Option<u32>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub foreground_color: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,

    // ─── Dashboard annotations ───────────────────────────────────
    #[serde(default)]
    pub active_cards: Option<u64>,
    #[serde(default)]
    pub total_redemptions: Option<u64>,
    #[serde(default)]
    pub total_punches: Option<u64>,
}

fn default_active() -> bool {
    true
}

impl Program {
    /// Merchant display name, or a placeholder when the API omits it.
    pub fn merchant_display_name(&self) -> &str {
        self.merchant_name.as_deref().unwrap_or("Merchant")
    }

    /// Stamps needed for a reward; programs saved without a count use 5.
    pub fn stamps_required(&self) -> u32 {
        if self.punches_required == 0 {
            5
        } else {
            self.punches_required
        }
    }

    /// Reward line shown on the join page.
    pub fn reward_line(&self) -> String {
        match &self.reward_description {
            Some(desc) if !desc.trim().is_empty() => desc.clone(),
            _ => format!(
                "Collect {} stamps and earn rewards",
                self.stamps_required()
            ),
        }
    }

    /// Share of cards that reached a redemption, in percent.
    ///
    /// Redemptions over active cards plus redemptions; 0 without active cards.
    pub fn completion_rate(&self) -> f64 {
        let active = self.active_cards.unwrap_or(0);
        let redeemed = self.total_redemptions.unwrap_or(0);
        if active == 0 {
            return 0.0;
        }
        redeemed as f64 / (active + redeemed) as f64 * 100.0
    }
}

/// Merchant identity attached to a group of programs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
}

/// Programs belonging to one merchant.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantGroup {
    pub merchant_info: MerchantInfo,
    pub programs: Vec<Program>,
}

/// Merchant programs in both flat and grouped form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPrograms {
    pub programs: Vec<Program>,
    pub groups: Vec<MerchantGroup>,
}

impl NormalizedPrograms {
    /// Number of programs, grouped or not.
    pub fn total_programs(&self) -> usize {
        self.programs.len()
    }
}

/// Normalize the merchant-programs payload.
///
/// Accepts `{ programs: { <merchant_id>: { merchant_info, programs } } }`,
/// `{ programs: [...] }` or a bare array. Anything else yields empty lists.
pub fn normalize_merchant_programs(payload: &Value) -> NormalizedPrograms {
    match payload.get("programs") {
        Some(Value::Object(merchants)) => {
            let mut normalized = NormalizedPrograms::default();

            for entry in merchants.values() {
                let merchant_info: MerchantInfo = entry
                    .get("merchant_info")
                    .and_then(|info| serde_json::from_value(info.clone()).ok())
                    .unwrap_or_default();

                let items = entry
                    .get("programs")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                let programs: Vec<Program> = items
                    .iter()
                    .filter_map(|item| annotate_program(item, entry, &merchant_info))
                    .collect();

                normalized.programs.extend(programs.iter().cloned());
                normalized.groups.push(MerchantGroup {
                    merchant_info,
                    programs,
                });
            }

            normalized
        }
        Some(Value::Array(items)) => flat(items),
        _ => match payload {
            Value::Array(items) => flat(items),
            _ => NormalizedPrograms::default(),
        },
    }
}

fn flat(items: &[Value]) -> NormalizedPrograms {
    NormalizedPrograms {
        programs: items
            .iter()
            .filter_map(|item| {
                let mut program: Program = serde_json::from_value(item.clone()).ok()?;
                program.total_redemptions = count(item, REDEMPTION_KEYS);
                Some(program)
            })
            .collect(),
        groups: Vec::new(),
    }
}

/// Decode one program and stamp it with its merchant's identity and counts.
fn annotate_program(item: &Value, entry: &Value, merchant: &MerchantInfo) -> Option<Program> {
    let mut program: Program = match serde_json::from_value(item.clone()) {
        Ok(program) => program,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping undecodable program");
            return None;
        }
    };

    program.brand_color = merchant.brand_color.clone();
    program.merchant_name = merchant.name.clone();
    program.merchant_logo_url = merchant.logo_url.clone();
    program.active_cards = count(item, &["active_cards"]).or_else(|| count(entry, &["active_cards"]));
    program.total_redemptions = count(item, REDEMPTION_KEYS).or_else(|| count(entry, REDEMPTION_KEYS));
    program.total_punches = count(item, &["total_punches"]).or_else(|| count(entry, &["total_punches"]));

    Some(program)
}

// The backend has shipped both spellings.
const REDEMPTION_KEYS: &[&str] = &["total_redemptions", "total_redepmtions"];

fn count(value: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_u64))
}
