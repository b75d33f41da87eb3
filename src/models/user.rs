//! User identity as supplied by the auth provider.

use serde::{Deserialize, Serialize};

/// Auth provider user record (only the fields this frontend reads).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Provider user id (UUID)
    pub id: String,
    /// Sign-in e-mail
    #[serde(default)]
    pub email: Option<String>,
    /// Profile fields captured at sign-up
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Sign-up metadata stored with the provider account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    /// Set to "admin" for operators
    #[serde(default)]
    pub role: Option<String>,
}

impl User {
    /// "First Last" when both names are known.
    pub fn full_name(&self) -> Option<String> {
        match (
            self.user_metadata.first_name.as_deref(),
            self.user_metadata.last_name.as_deref(),
        ) {
            (Some(first), Some(last)) if !first.is_empty() => {
                Some(format!("{first} {last}").trim().to_string())
            }
            (Some(first), None) if !first.is_empty() => Some(first.to_string()),
            _ => None,
        }
    }
}

/// Application role, resolved through the loyalty API profile call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Merchant,
}

impl UserRole {
    /// Landing page after sign-in.
    pub fn home_path(self) -> &'static str {
        match self {
            UserRole::Customer => "/wallet",
            UserRole::Merchant => "/merchant",
        }
    }

    /// Lenient parse; anything unrecognized is a customer.
    pub fn from_profile(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            Some(r) if r.eq_ignore_ascii_case("merchant") => UserRole::Merchant,
            _ => UserRole::Customer,
        }
    }
}

/// Split a full name into first name and the rest.
pub fn split_full_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}
