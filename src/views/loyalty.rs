// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Loyalty display widgets: financial card, punch grid, progress ring,
//! QR display and reward badge.

use super::{css_value, escape};
use crate::models::card::progress_percent;

/// Card face styled like a payment card.
pub struct FinancialCard<'a> {
    pub brand_name: &'a str,
    pub logo_url: Option<&'a str>,
    /// CSS background (color or gradient); ignored when `class` is set
    pub background: Option<&'a str>,
    /// Gradient class such as `gradient-gold`
    pub class: Option<&'a str>,
    pub text_color: &'a str,
    pub balance: &'a str,
    pub card_number: &'a str,
}

impl FinancialCard<'_> {
    pub fn render(&self, children: &str) -> String {
        let logo = self
            .logo_url
            .filter(|u| !u.is_empty())
            .map(|u| {
                format!(
                    r#"<img class="fc-logo" src="{}" alt="{}">"#,
                    escape(u),
                    escape(self.brand_name)
                )
            })
            .unwrap_or_default();

        let mut style = format!("color: {}", css_value(self.text_color));
        if self.class.is_none() {
            if let Some(bg) = self.background {
                style.push_str(&format!("; background: {}", css_value(bg)));
            }
        }

        format!(
            r#"<div class="financial-card {class}" style="{style}"><div class="fc-head"><span class="fc-brand">{brand}</span>{logo}</div><div class="fc-balance">{balance}</div><div class="fc-number">{number}</div>{children}</div>"#,
            class = self.class.unwrap_or_default(),
            brand = escape(self.brand_name),
            balance = escape(self.balance),
            number = escape(self.card_number),
        )
    }
}

/// Column count for a punch grid of `total` stamps.
pub fn grid_columns(total: u32) -> u32 {
    match total {
        0..=6 => 3,
        7..=10 => 5,
        11..=12 => 4,
        _ => 5,
    }
}

/// Stamp grid: one cell per required punch, filled up to `current`.
pub fn punch_grid(current: u32, required: u32) -> String {
    let stamps: String = (0..required)
        .map(|i| {
            if i < current {
                r#"<div class="stamp stamp-filled" aria-label="punched">&#10003;</div>"#
            } else {
                r#"<div class="stamp" aria-label="empty"></div>"#
            }
        })
        .collect();

    format!(
        r#"<div class="punch-grid grid-cols-{cols}">{stamps}</div><p class="caption">{current} of {required} punches</p>"#,
        cols = grid_columns(required),
    )
}

/// Geometry of the progress ring stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub radius: f64,
    pub circumference: f64,
    pub offset: f64,
}

impl RingGeometry {
    pub fn new(size: u32, percent: f64) -> Self {
        let radius = (f64::from(size) - 8.0) / 2.0;
        let circumference = 2.0 * std::f64::consts::PI * radius;
        let offset = circumference - (percent / 100.0) * circumference;
        Self {
            radius,
            circumference,
            offset,
        }
    }
}

/// Circular progress indicator rendered as inline SVG.
pub fn progress_ring(current: u32, total: u32, size: u32) -> String {
    let percent = progress_percent(current, total);
    let g = RingGeometry::new(size, percent);
    let center = f64::from(size) / 2.0;

    format!(
        r##"<div class="progress-ring"><svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" role="img" aria-label="{pct:.0}% complete"><defs><linearGradient id="progressGradient" x1="0%" y1="0%" x2="100%" y2="0%"><stop offset="0%" stop-color="#667eea"/><stop offset="100%" stop-color="#06b6d4"/></linearGradient></defs><circle cx="{center}" cy="{center}" r="{r:.2}" stroke="#718096" stroke-width="8" fill="none" opacity="0.2"/><circle cx="{center}" cy="{center}" r="{r:.2}" stroke="url(#progressGradient)" stroke-width="8" fill="none" stroke-dasharray="{c:.2}" stroke-dashoffset="{o:.2}" stroke-linecap="round" transform="rotate(-90 {center} {center})"/></svg><div class="progress-ring-label"><span class="stat">{current}/{total}</span><span class="caption">{pct:.0}%</span></div></div>"##,
        pct = percent,
        r = g.radius,
        c = g.circumference,
        o = g.offset,
    )
}

/// QR payload panel. The encoded value is printed for scanners that accept
/// typed input.
pub fn qr_display(value: &str, title: &str, subtitle: &str) -> String {
    format!(
        r#"<div class="qr-display"><h3>{title}</h3><div class="qr-code" data-qr-value="{value}">{value}</div><p class="caption">{subtitle}</p></div>"#,
        title = escape(title),
        value = escape(value),
        subtitle = escape(subtitle),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardState {
    Locked,
    Progress,
    Unlocked,
}

pub fn reward_badge(state: RewardState, reward: &str) -> String {
    let (class, icon) = match state {
        RewardState::Locked => ("reward-locked", "&#128274;"),
        RewardState::Progress => ("reward-progress", "&#9203;"),
        RewardState::Unlocked => ("reward-unlocked", "&#127873;"),
    };
    format!(
        r#"<span class="reward-badge {class}">{icon} {}</span>"#,
        escape(reward)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(6), 3);
        assert_eq!(grid_columns(8), 5);
        assert_eq!(grid_columns(10), 5);
        assert_eq!(grid_columns(12), 4);
        assert_eq!(grid_columns(20), 5);
    }

    #[test]
    fn test_punch_grid_fills_current() {
        let html = punch_grid(3, 8);
        assert_eq!(html.matches("stamp-filled").count(), 3);
        assert_eq!(html.matches(r#"aria-label="empty""#).count(), 5);
        assert!(html.contains("grid-cols-5"));
        assert!(html.contains("3 of 8 punches"));
    }

    #[test]
    fn test_ring_geometry() {
        let g = RingGeometry::new(140, 50.0);
        assert_eq!(g.radius, 66.0);
        assert!((g.offset - g.circumference / 2.0).abs() < 1e-9);

        let full = RingGeometry::new(120, 100.0);
        assert!(full.offset.abs() < 1e-9);
    }

    #[test]
    fn test_financial_card_sanitizes_background() {
        let html = FinancialCard {
            brand_name: "Deli",
            logo_url: None,
            background: Some("red;}</style>"),
            class: None,
            text_color: "#fff",
            balance: "READY",
            card_number: "Card #abcd1234",
        }
        .render("");
        assert!(html.contains("background: red"));
        assert!(!html.contains("</style>"));
        assert!(html.contains("READY"));
    }
}
