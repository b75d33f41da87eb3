// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie and access guard tests.

use axum::http::StatusCode;
use punchcard_web::middleware::session::{decode_session_token, SESSION_COOKIE};
use punchcard_web::models::UserRole;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_redirects_to_login() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(common::get("/wallet", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login?next=%2Fwallet");
}

#[tokio::test]
async fn test_form_post_without_session_does_not_return_to_post_target() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(common::post_form("/merchant/punch", None, &[("card_id", "card-1")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login");

    // A lapsed session on a form post returns to the role's home page.
    let claims = common::claims(UserRole::Merchant, false, &common::expired_provider_token());
    let response = app
        .oneshot(common::post_form(
            "/merchant/punch",
            Some(&common::session_cookie(&claims)),
            &[("card_id", "card-1")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login?next=%2Fmerchant");
}

#[tokio::test]
async fn test_tampered_session_is_rejected() {
    let (app, _) = common::create_test_app();
    let cookie = common::customer_cookie();
    let tampered = format!("{}x", cookie);

    let response = app
        .oneshot(common::get("/card/abc", Some(&tampered)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/login?next=%2Fcard%2Fabc");
}

#[tokio::test]
async fn test_session_signed_with_other_key_is_rejected() {
    let (app, _) = common::create_test_app();
    let claims = common::claims(UserRole::Customer, false, common::CUSTOMER_TOKEN);
    let token = punchcard_web::middleware::session::create_session_token(
        &claims,
        b"another_key_that_is_long_enough!",
    )
    .unwrap();

    let response = app
        .oneshot(common::get("/wallet", Some(&format!("{SESSION_COOKIE}={token}"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/login"));
}

#[tokio::test]
async fn test_expired_provider_token_is_refreshed() {
    let (app, state, mock) = common::create_test_app_with_upstream().await;
    let mut claims = common::claims(UserRole::Customer, false, &common::expired_provider_token());
    claims.refresh_token = Some("refresh-1".to_string());

    let response = app
        .oneshot(common::get("/wallet", Some(&common::session_cookie(&claims))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mock.seen("/auth/v1/token").len(), 1);

    // The re-signed cookie carries the fresh provider token.
    let cookies = common::set_cookie_headers(&response);
    let session = cookies
        .iter()
        .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
        .expect("refreshed session cookie");
    let token = session
        .trim_start_matches(&format!("{SESSION_COOKIE}="))
        .split(';')
        .next()
        .unwrap();
    let decoded = decode_session_token(token, &state.config.session_signing_key).unwrap();
    assert_eq!(decoded.access_token, common::CUSTOMER_TOKEN);

    let body = common::body_text(response).await;
    assert!(body.contains("/card/card-new"));
}

#[tokio::test]
async fn test_expired_provider_token_without_refresh_signs_out() {
    let (app, _) = common::create_test_app();
    let claims = common::claims(UserRole::Customer, false, &common::expired_provider_token());

    let response = app
        .oneshot(common::get("/wallet", Some(&common::session_cookie(&claims))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(common::location(&response).starts_with("/login?next="));
    let cookies = common::set_cookie_headers(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{SESSION_COOKIE}=")) && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_logout_clears_cookie_with_matching_attributes() {
    let (app, _, mock) = common::create_test_app_with_upstream().await;
    let cookie = common::customer_cookie();

    let response = app
        .oneshot(common::post_form("/logout", Some(&cookie), &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/");

    let cookies = common::set_cookie_headers(&response);
    let removal = cookies
        .iter()
        .find(|c| c.starts_with(&format!("{SESSION_COOKIE}=")))
        .expect("removal cookie");
    assert!(removal.contains("Path=/"));
    assert!(removal.contains("HttpOnly"));
    assert!(removal.contains("SameSite=Lax"));
    assert!(removal.contains("Max-Age=0"));
    assert!(!removal.contains("Secure"));

    let seen = mock.seen("/auth/v1/logout");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer customer-token"));
}

#[tokio::test]
async fn test_landing_redirects_signed_in_users_home() {
    let (app, _) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(common::get("/", Some(&common::merchant_cookie())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/merchant");

    let response = app.oneshot(common::get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_text(response).await;
    assert!(body.contains("Create account"));
}
