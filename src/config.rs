// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The server only talks to two upstreams: the loyalty REST API and the
//! hosted auth provider. Everything else is local rendering.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Upstreams ---
    /// Base URL of the loyalty REST API
    pub api_url: String,
    /// Base URL of the hosted auth provider (Supabase project URL)
    pub supabase_url: String,
    /// Public anon key sent as `apikey` on every auth provider call
    pub supabase_anon_key: String,

    // --- This server ---
    /// Public URL this frontend is served from (cookies, CORS, recovery links)
    pub public_url: String,
    /// Server port
    pub port: u16,
    /// Key used to sign session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// E-mail addresses granted the admin dashboard
    pub admin_emails: Vec<String>,
    /// Address behind the wallet's "Send Feedback" link
    pub feedback_email: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_url: env::var("API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|v| parse_email_list(&v))
                .unwrap_or_else(|_| vec!["admin@pushcard.com".to_string()]),
            feedback_email: env::var("FEEDBACK_EMAIL")
                .unwrap_or_else(|_| "notify@cashbackpanama.com".to_string()),
        })
    }

    /// Config for tests: upstreams point at a closed local port.
    pub fn test_default() -> Self {
        Self {
            api_url: "http://127.0.0.1:9".to_string(),
            supabase_url: "http://127.0.0.1:9".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            public_url: "http://localhost:8080".to_string(),
            port: 8080,
            session_signing_key: b"test_session_key_32_bytes_min!!".to_vec(),
            admin_emails: vec!["admin@pushcard.com".to_string()],
            feedback_email: "feedback@example.com".to_string(),
        }
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }

    /// Whether `email` is on the admin list (case-insensitive).
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
