// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side HTML rendering.
//!
//! Every dynamic value goes through [`escape`] before it reaches markup.

pub mod components;
pub mod loyalty;
pub mod pages;

use crate::middleware::Session;
use axum::response::Html;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Restrict a CSS value from the API to characters a color or gradient needs.
pub fn css_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || " #%.,()-".contains(*c))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Inline, dismissible status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
        }
    }

    /// Render with a close link back to `dismiss_href`.
    pub fn render(&self, dismiss_href: &str) -> String {
        let class = match self.kind {
            BannerKind::Success => "banner banner-success",
            BannerKind::Error => "banner banner-error",
        };
        format!(
            r#"<div class="{class}" role="alert"><p>{}</p><a class="banner-dismiss" href="{}" aria-label="Dismiss">&times;</a></div>"#,
            escape(&self.text),
            escape(dismiss_href),
        )
    }
}

pub(crate) fn render_banner(banner: Option<&Banner>, dismiss_href: &str) -> String {
    banner.map(|b| b.render(dismiss_href)).unwrap_or_default()
}

/// Top navigation for signed-in pages.
fn nav(session: Option<&Session>) -> String {
    let Some(session) = session else {
        return r#"<nav class="nav"><a class="brand" href="/">PushCard</a><a href="/login">Sign in</a></nav>"#
            .to_string();
    };

    let name = session
        .name
        .as_deref()
        .map(|n| format!(r#"<div class="caption">{}</div>"#, escape(n)))
        .unwrap_or_default();
    let admin = if session.is_admin {
        format!(
            r#"<a href="/admin">{}</a>"#,
            components::badge("Admin", components::BadgeVariant::Outline)
        )
    } else {
        String::new()
    };

    format!(
        r#"<nav class="nav"><a class="brand" href="{home}">PushCard</a><div class="nav-user"><div>{email}</div>{name}</div>{admin}<form method="post" action="/logout">{signout}</form></nav>"#,
        home = session.role.home_path(),
        email = escape(&session.email),
        signout = components::button("Sign Out", components::ButtonVariant::Ghost, components::ButtonSize::Sm),
    )
}

/// Wrap `body` in the document shell.
pub fn layout(title: &str, session: Option<&Session>, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · PushCard</title>
<link rel="stylesheet" href="/assets/app.css">
</head>
<body>
{nav}
<main class="container">
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(session),
    ))
}

/// Full-bleed layout without navigation (auth and join pages).
pub fn bare_layout(title: &str, background: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · PushCard</title>
<link rel="stylesheet" href="/assets/app.css">
</head>
<body class="bare" style="background: {background}">
<main class="narrow">
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        background = css_value(background),
    ))
}

pub const STYLESHEET: &str = include_str!("app.css");
