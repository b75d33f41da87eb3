// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page renderers.

use super::components::{
    badge, button, button_to, card, link_button, BadgeVariant, ButtonSize, ButtonVariant, Input,
};
use super::loyalty::{
    progress_ring, punch_grid, qr_display, reward_badge, FinancialCard, RewardState,
};
use super::{bare_layout, css_value, escape, layout, render_banner, Banner};
use crate::middleware::Session;
use crate::models::{BrandPalette, NormalizedPrograms, Program, PunchCard};
use crate::services::activity::{format_time_ago, PunchRecord};
use axum::http::StatusCode;
use axum::response::Html;
use chrono::{DateTime, Utc};

const AUTH_BACKGROUND: &str =
    "linear-gradient(155deg, rgba(30, 123, 60, 0.59) 0%, rgba(200, 217, 72, 0.7) 100%)";
const DEFAULT_BRAND: &str = "#667eea";

fn urlencode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

// ─── Landing & errors ────────────────────────────────────────

pub fn landing() -> Html<String> {
    let body = format!(
        r#"<section class="glass center stack"><h1>Your loyalty cards, all in one place</h1><p>Scan a merchant's QR code to join their program, collect punches and unlock rewards.</p>{signup}{login}</section>"#,
        signup = link_button("Create account", "/signup", ButtonVariant::Gradient, ButtonSize::Lg),
        login = link_button("Sign in", "/login", ButtonVariant::Secondary, ButtonSize::Lg),
    );
    bare_layout("Welcome", AUTH_BACKGROUND, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        r#"<section class="glass center stack"><h1>{code}</h1><p>{message}</p>{home}</section>"#,
        code = status.as_u16(),
        message = escape(message),
        home = link_button("Go Home", "/", ButtonVariant::Gradient, ButtonSize::Md),
    );
    bare_layout("Error", AUTH_BACKGROUND, &body)
}

pub fn not_found() -> Html<String> {
    error_page(StatusCode::NOT_FOUND, "Page not found")
}

// ─── Auth forms ──────────────────────────────────────────────

/// Values echoed back into the login form.
#[derive(Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub next: Option<String>,
    pub error: Option<String>,
    pub info: Option<String>,
}

fn form_messages(error: Option<&str>, info: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(e) = error {
        out.push_str(&format!(r#"<div class="banner banner-error" role="alert"><p>{}</p></div>"#, escape(e)));
    }
    if let Some(i) = info {
        out.push_str(&format!(r#"<div class="banner banner-info"><p>{}</p></div>"#, escape(i)));
    }
    out
}

pub fn login(view: &LoginView) -> Html<String> {
    let next = view
        .next
        .as_deref()
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, escape(n)))
        .unwrap_or_default();

    let form = format!(
        r#"<form method="post" action="/login">{messages}{next}{email}{password}{submit}{forgot}</form><p class="center caption">Don't have an account? <a href="/signup">Sign up</a></p>"#,
        messages = form_messages(view.error.as_deref(), view.info.as_deref()),
        email = Input::new("email", "email", "Email address")
            .value(&view.email)
            .placeholder("Email address")
            .autocomplete("email")
            .render(),
        password = Input::new("password", "password", "Password")
            .placeholder("Password")
            .autocomplete("current-password")
            .optional()
            .render(),
        submit = button("Sign in", ButtonVariant::Gradient, ButtonSize::Lg),
        forgot = button_to("Forgot password?", "/forgot-password", ButtonVariant::Ghost, ButtonSize::Sm),
    );

    bare_layout(
        "Sign in",
        AUTH_BACKGROUND,
        &card(Some("Welcome back"), Some("Sign in to your account"), &form),
    )
}

/// Values echoed back into the sign-up form.
#[derive(Debug, Default)]
pub struct SignupView {
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
    pub email: String,
    pub error: Option<String>,
    pub info: Option<String>,
}

pub fn signup(view: &SignupView) -> Html<String> {
    let form = format!(
        r#"<form method="post" action="/signup">{messages}{first}{last}{birth}{email}{password}{submit}</form><p class="center caption">Already have an account? <a href="/login">Sign in</a></p>"#,
        messages = form_messages(view.error.as_deref(), view.info.as_deref()),
        first = Input::new("first_name", "text", "First Name")
            .value(&view.first_name)
            .placeholder("First Name")
            .autocomplete("given-name")
            .render(),
        last = Input::new("last_name", "text", "Last Name")
            .value(&view.last_name)
            .placeholder("Last Name")
            .autocomplete("family-name")
            .render(),
        birth = Input::new("birthdate", "date", "Birth Date")
            .value(&view.birthdate)
            .render(),
        email = Input::new("email", "email", "Email address")
            .value(&view.email)
            .placeholder("Email address")
            .autocomplete("email")
            .render(),
        password = Input::new("password", "password", "Password")
            .placeholder("Password")
            .autocomplete("new-password")
            .render(),
        submit = button("Create account", ButtonVariant::Gradient, ButtonSize::Lg),
    );

    bare_layout(
        "Sign up",
        AUTH_BACKGROUND,
        &card(Some("Create your account"), Some("Start collecting rewards today"), &form),
    )
}

pub fn reset_password(error: Option<&str>, info: Option<&str>) -> Html<String> {
    let form = format!(
        r#"<form method="post" action="/reset-password">{messages}{password}{confirm}{submit}</form><p class="center caption"><a href="/login">Back to sign in</a></p>"#,
        messages = form_messages(error, info),
        password = Input::new("password", "password", "New password")
            .placeholder("••••••••")
            .autocomplete("new-password")
            .render(),
        confirm = Input::new("confirm", "password", "Confirm password")
            .placeholder("••••••••")
            .autocomplete("new-password")
            .render(),
        submit = button("Update Password", ButtonVariant::Gradient, ButtonSize::Lg),
    );

    bare_layout(
        "Reset password",
        AUTH_BACKGROUND,
        &card(Some("Set a new password"), Some("Choose a password with at least 6 characters"), &form),
    )
}

// ─── Customer wallet ─────────────────────────────────────────

fn wallet_card(card: &PunchCard) -> String {
    let expired = if card.is_expired() {
        format!(r#"<div class="expired">{}</div>"#, badge("Expired", BadgeVariant::Error))
    } else {
        String::new()
    };

    let face = FinancialCard {
        brand_name: &card.merchant_name,
        logo_url: card.merchant_logo_url.as_deref(),
        background: Some(card.background()),
        class: None,
        text_color: card.foreground(),
        balance: &card.balance_label(),
        card_number: &format!("Card #{}", card.short_id()),
    }
    .render(&format!(
        r#"<p class="fc-progress">{}/{}</p>"#,
        card.current_punches, card.punches_required
    ));

    format!(
        r#"<a class="wallet-card" href="/card/{id}">{expired}{face}</a>"#,
        id = urlencode(&card.id),
    )
}

pub fn wallet(session: &Session, cards: &[PunchCard], feedback_email: &str) -> Html<String> {
    let greeting = session
        .name
        .as_deref()
        .map(|n| format!(r#"<p class="caption">Welcome back</p><h1>{}</h1>"#, escape(n)))
        .unwrap_or_else(|| "<h1>My Cards</h1>".to_string());

    let list = if cards.is_empty() {
        r#"<div class="empty"><h2>No cards yet</h2><p class="caption">Scan a QR code at a participating merchant to start earning rewards</p></div>"#.to_string()
    } else {
        cards.iter().map(wallet_card).collect()
    };

    let feedback = format!(
        r#"<p class="center"><a class="caption" href="mailto:{}?subject=PunchCard%20Customer%20Feedback">Send Feedback</a></p>"#,
        escape(feedback_email)
    );

    let body = format!("{greeting}<section class=\"stack\">{list}</section>{feedback}");
    layout("My Cards", Some(session), &body)
}

fn wallet_buttons(program_id: &str) -> String {
    let q = urlencode(program_id);
    format!(
        r#"<div class="stack"><h3 class="center">Add to your wallet</h3>{apple}{google}</div>"#,
        apple = link_button(
            "Add to Apple Wallet",
            &format!("/wallet/pass/apple?program_id={q}"),
            ButtonVariant::Primary,
            ButtonSize::Lg
        ),
        google = link_button(
            "Add to Google Wallet",
            &format!("/wallet/pass/google?program_id={q}"),
            ButtonVariant::Primary,
            ButtonSize::Lg
        ),
    )
}

pub fn card_detail(session: &Session, card: &PunchCard) -> Html<String> {
    let headline = if card.is_complete() {
        format!(
            r#"<div class="center stack"><h1>Reward unlocked!</h1><p>Show this card to {} to redeem.</p></div>"#,
            escape(&card.merchant_name)
        )
    } else {
        format!(
            r#"<div class="center"><h1>{} Rewards</h1><p class="caption">{}</p></div>"#,
            escape(&card.merchant_name),
            escape(&card.remaining_headline())
        )
    };

    let reward = if card.is_complete() {
        reward_badge(RewardState::Unlocked, "Ready")
    } else {
        String::new()
    };

    let face = FinancialCard {
        brand_name: &card.merchant_name,
        logo_url: card.merchant_logo_url.as_deref(),
        background: None,
        class: Some(card.tier().css_class()),
        text_color: "#ffffff",
        balance: &card.balance_label(),
        card_number: &format!("#{}", card.short_id()),
    }
    .render(&format!(
        "{}{}",
        punch_grid(card.current_punches, card.punches_required),
        reward
    ));

    let description = card
        .reward_description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| super::components::card(Some("Your reward"), None, &format!("<p>{}</p>", escape(d))))
        .unwrap_or_default();

    let expired = if card.is_expired() {
        format!(
            r#"<p class="center">{} This card has expired.</p>"#,
            badge("Expired", BadgeVariant::Error)
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<p>{back}</p>{headline}{expired}{face}{ring}{qr}{description}{wallet}<p class="center caption">Member since {since}</p>"#,
        back = link_button("Back to Cards", "/wallet", ButtonVariant::Ghost, ButtonSize::Sm),
        ring = progress_ring(card.current_punches, card.punches_required, 140),
        qr = qr_display(&card.qr_value(), "Scan to Add Punch", "Show this QR code to the merchant"),
        wallet = wallet_buttons(&card.program_id),
        since = escape(&card.member_since()),
    );
    layout(&format!("{} card", card.merchant_name), Some(session), &body)
}

// ─── Join ────────────────────────────────────────────────────

/// What the join page shows below the program header.
#[derive(Debug)]
pub enum JoinPanel {
    /// Visitor is signed out: inline sign-up form
    SignUp {
        name: String,
        email: String,
        error: Option<String>,
    },
    /// Account created, e-mail confirmation pending
    ConfirmEmail,
    /// Customer already holds a card for the program
    ExistingCard(PunchCard),
    /// Customer has no card yet: preview and wallet buttons
    Preview,
    /// Merchants cannot join programs
    Merchant,
}

fn program_logo(program: &Program) -> String {
    let fg = program.foreground_color.as_deref().unwrap_or("#ffffff");
    match program.merchant_logo_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => format!(
            r#"<img class="join-logo" src="{}" alt="{} logo" width="112" height="112">"#,
            escape(url),
            escape(program.merchant_display_name())
        ),
        None => format!(
            r#"<div class="join-logo" style="color: {}"><span class="stat">{}</span></div>"#,
            css_value(fg),
            escape(
                &program
                    .merchant_display_name()
                    .chars()
                    .next()
                    .map(String::from)
                    .unwrap_or_default()
            )
        ),
    }
}

pub fn join(program: &Program, palette: &BrandPalette, panel: &JoinPanel) -> Html<String> {
    let fg = program.foreground_color.as_deref().unwrap_or("#ffffff");
    let merchant = escape(program.merchant_display_name());
    let action = format!("/join/{}", urlencode(&program.id));

    let panel_html = match panel {
        JoinPanel::SignUp { name, email, error } => format!(
            r#"<div class="center"><h2>Get Started</h2><p class="caption">Join {merchant} and start earning</p></div><form method="post" action="{action}">{messages}{name}{email}{password}{submit}</form><p class="center caption">Already have an account? <a href="/login?next={next}">Sign in</a></p>"#,
            action = escape(&action),
            messages = form_messages(error.as_deref(), None),
            name = Input::new("name", "text", "Full Name")
                .value(name)
                .placeholder("Jane Doe")
                .autocomplete("name")
                .render(),
            email = Input::new("email", "email", "Email")
                .value(email)
                .placeholder("you@example.com")
                .autocomplete("email")
                .render(),
            password = Input::new("password", "password", "Password")
                .placeholder("At least 6 characters")
                .autocomplete("new-password")
                .render(),
            submit = button("Join & Get Card", ButtonVariant::Gradient, ButtonSize::Lg),
            next = urlencode(&action),
        ),
        JoinPanel::ConfirmEmail => format!(
            r#"<div class="center stack"><h2>Check your email</h2><p>Confirm your address, then sign in to get your {merchant} card.</p>{login}</div>"#,
            login = link_button(
                "Sign in",
                &format!("/login?next={}", urlencode(&action)),
                ButtonVariant::Gradient,
                ButtonSize::Lg
            ),
        ),
        JoinPanel::ExistingCard(card) => {
            let face = FinancialCard {
                brand_name: &card.merchant_name,
                logo_url: card.merchant_logo_url.as_deref(),
                background: Some(card.background()),
                class: None,
                text_color: card.foreground(),
                balance: &card.balance_label(),
                card_number: &format!("Card #{}", card.short_id()),
            }
            .render("");
            let status = if card.is_expired() {
                badge("Expired", BadgeVariant::Error)
            } else if card.is_complete() {
                reward_badge(RewardState::Unlocked, "Reward ready")
            } else {
                reward_badge(
                    RewardState::Progress,
                    &format!("{}/{} punches", card.current_punches, card.punches_required),
                )
            };
            format!(
                r#"<div class="stack"><h2 class="center">You already have this card</h2>{face}<p class="center">{status}</p>{qr}{wallet}{view}</div>"#,
                qr = qr_display(&card.qr_value(), "Scan to Add Punch", "Show this QR code to the merchant"),
                wallet = wallet_buttons(&card.program_id),
                view = link_button(
                    "View card",
                    &format!("/card/{}", urlencode(&card.id)),
                    ButtonVariant::Secondary,
                    ButtonSize::Lg
                ),
            )
        }
        JoinPanel::Preview => {
            let face = FinancialCard {
                brand_name: program.merchant_display_name(),
                logo_url: program.merchant_logo_url.as_deref(),
                background: Some(program.brand_color.as_deref().unwrap_or(DEFAULT_BRAND)),
                class: None,
                text_color: fg,
                balance: &program.punches_required.to_string(),
                card_number: &program.name,
            }
            .render(&punch_grid(0, program.punches_required));
            format!(
                r#"<div class="stack"><h2 class="center">Your new card</h2>{face}{wallet}</div>"#,
                wallet = wallet_buttons(&program.id),
            )
        }
        JoinPanel::Merchant => r#"<div class="center stack"><h2>Merchant account</h2><p>Merchant accounts can't join loyalty programs. Sign in with a customer account to collect punches.</p><p><a href="/merchant">Go to dashboard</a></p></div>"#.to_string(),
    };

    let body = format!(
        r#"<div class="center stack">{logo}<h1 style="color: {fg}">{name}</h1><p style="color: {fg}">{reward}</p></div><div class="glass">{panel_html}</div>"#,
        logo = program_logo(program),
        fg = css_value(fg),
        name = escape(&program.name),
        reward = escape(&program.reward_line()),
    );

    let background = match program.brand_color.as_deref() {
        Some(_) => palette.css_gradient(),
        None => DEFAULT_BRAND.to_string(),
    };
    bare_layout(&program.name, &background, &body)
}

// ─── Merchant dashboard ──────────────────────────────────────

fn scan_form(action: &str, label: &str, variant: ButtonVariant) -> String {
    format!(
        r#"<form method="{method}" action="{action}" class="card card-content">{input}{submit}</form>"#,
        method = if action.ends_with("redeem") { "get" } else { "post" },
        action = escape(action),
        input = Input::new("card_id", "text", "Scanned card")
            .placeholder("pushcard://punch/…")
            .autocomplete("off")
            .render(),
        submit = button(label, variant, ButtonSize::Lg),
    )
}

fn program_tile(program: &Program, group_color: &str) -> String {
    let color = program.brand_color.as_deref().unwrap_or(group_color);
    let count = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "—".to_string());
    let status = if program.active {
        badge("Active", BadgeVariant::Success)
    } else {
        badge("Inactive", BadgeVariant::Warning)
    };
    let join_link = format!("/join/{}", urlencode(&program.id));

    let rate = program.completion_rate();

    format!(
        r#"<div class="card" style="background-color: {color}40"><div class="card-header"><h3 class="card-title">{name}</h3><p class="card-description">{merchant}</p></div><div class="card-content"><p>{status} Collect {punches} stamps, get 1 free {reward}</p><div class="grid grid-3"><div><div class="stat">{active}</div><div class="caption">Active cards</div></div><div><div class="stat">{total_punches}</div><div class="caption">Total punches</div></div><div><div class="stat">{redeemed}</div><div class="caption">Redemptions</div></div></div><div class="completion"><p>Completion rate <strong>{rate:.1}%</strong></p><div class="meter"><div class="meter-fill" style="width: {rate:.1}%"></div></div></div><p class="caption">Join link: <a href="{join_link}">{join_link}</a></p></div></div>"#,
        color = css_value(color),
        name = escape(&program.name),
        merchant = escape(program.merchant_display_name()),
        punches = program.stamps_required(),
        active = count(program.active_cards),
        total_punches = count(program.total_punches),
        redeemed = count(program.total_redemptions),
        reward = escape(
            program
                .reward_description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("reward")
        ),
        join_link = escape(&join_link),
    )
}

pub fn merchant_dashboard(
    session: &Session,
    programs: Option<&NormalizedPrograms>,
    banner: Option<&Banner>,
) -> Html<String> {
    let actions = format!(
        r#"<div class="grid grid-2">{punch}{redeem}</div>"#,
        punch = scan_form("/merchant/punch", "Add Punch", ButtonVariant::Gradient),
        redeem = scan_form("/merchant/redeem", "Redeem", ButtonVariant::Success),
    );

    let list = match programs {
        None => card(None, None, r#"<p class="center caption">Programs are unavailable right now.</p>"#),
        Some(p) if p.programs.is_empty() => card(
            None,
            None,
            r#"<div class="empty"><h3>No programs yet</h3><p class="caption">Contact support to set up your loyalty programs.</p></div>"#,
        ),
        Some(p) if p.groups.is_empty() => {
            let tiles: String = p
                .programs
                .iter()
                .map(|program| program_tile(program, DEFAULT_BRAND))
                .collect();
            format!(r#"<div class="grid grid-programs">{tiles}</div>"#)
        }
        Some(p) => {
            let groups: String = p
                .groups
                .iter()
                .map(|group| {
                    let merchant = &group.merchant_info;
                    let brand = merchant.brand_color.as_deref().unwrap_or(DEFAULT_BRAND);
                    let logo = merchant
                        .logo_url
                        .as_deref()
                        .filter(|u| !u.is_empty())
                        .map(|u| {
                            format!(
                                r#"<img class="fc-logo" src="{}" alt="{}">"#,
                                escape(u),
                                escape(merchant.name.as_deref().unwrap_or_default())
                            )
                        })
                        .unwrap_or_default();
                    let tiles: String = group.programs.iter().map(|p| program_tile(p, brand)).collect();
                    format!(
                        r#"<div class="card"><div class="card-header"><h3 class="card-title">{name}</h3><p class="caption">Programs</p>{logo}</div><div class="card-content grid">{tiles}</div></div>"#,
                        name = escape(merchant.name.as_deref().unwrap_or("Merchant")),
                    )
                })
                .collect();
            format!(r#"<div class="grid grid-programs">{groups}</div>"#)
        }
    };

    let body = format!(
        r#"{banner}{actions}<h2>Your Loyalty Programs</h2>{list}"#,
        banner = render_banner(banner, "/merchant"),
    );
    layout("Merchant Dashboard", Some(session), &body)
}

pub fn redeem_confirm(session: &Session, card_id: &str) -> Html<String> {
    let body = card(
        Some("Redeem reward?"),
        Some("This will redeem the reward and reset the customer's card."),
        &format!(
            r#"<p>Card <code>{id}</code></p><form method="post" action="/merchant/redeem"><input type="hidden" name="card_id" value="{id}"><div class="grid grid-2">{cancel}{confirm}</div></form>"#,
            id = escape(card_id),
            cancel = link_button("Cancel", "/merchant", ButtonVariant::Secondary, ButtonSize::Lg),
            confirm = button("Confirm", ButtonVariant::Success, ButtonSize::Lg),
        ),
    );
    layout("Confirm redemption", Some(session), &body)
}

// ─── Admin dashboard ─────────────────────────────────────────

pub fn admin_dashboard(
    session: &Session,
    recent: &[PunchRecord],
    now: DateTime<Utc>,
    banner: Option<&Banner>,
) -> Html<String> {
    let rows: String = if recent.is_empty() {
        r#"<p class="caption">No punches recorded yet.</p>"#.to_string()
    } else {
        recent
            .iter()
            .map(|r| {
                let customer = r
                    .customer_id
                    .as_deref()
                    .map(|c| format!("Customer {}", escape(c)))
                    .unwrap_or_else(|| "Customer".to_string());
                let remaining = match r.remaining {
                    Some(n) if n > 0 => format!("{n} to go"),
                    _ => "Complete".to_string(),
                };
                format!(
                    r#"<li><strong>{customer}</strong> · Card {card} · {remaining} <span class="caption">{ago}</span></li>"#,
                    card = escape(&r.card_id),
                    ago = format_time_ago(r.punched_at, now),
                )
            })
            .collect::<String>()
    };

    let body = format!(
        r#"{banner}<h1>Admin {admin}</h1><div class="grid grid-2"><form method="post" action="/admin/scan" class="card card-content">{input}{submit}</form>{customer}</div><h2>Recent Punches</h2><ul class="stack">{rows}</ul>"#,
        banner = render_banner(banner, "/admin"),
        admin = badge("Admin", BadgeVariant::Default),
        input = Input::new("payload", "text", "Scanned code")
            .placeholder("pushcard://customer/…/card/…")
            .autocomplete("off")
            .render(),
        submit = button("Scan Customer Card", ButtonVariant::Gradient, ButtonSize::Lg),
        customer = link_button("Customer View", "/wallet", ButtonVariant::Secondary, ButtonSize::Lg),
    );
    layout("Admin", Some(session), &body)
}
