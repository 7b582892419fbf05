mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::{TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};

#[actix_rt::test]
async fn admin_login_issues_a_bearer_token() {
    let app = TestApp::spawn().await;

    let auth = app.login().await;

    assert_eq!(auth.token_type, "Bearer");
    assert_eq!(auth.expires_in, app.config.jwt_expiration_minutes * 60);
    assert!(!auth.access_token.is_empty());
}

#[actix_rt::test]
async fn email_comparison_ignores_case() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("auth/login"))
        .json(&json!({ "email": ADMIN_EMAIL.to_uppercase(), "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;

    let attempts = [
        json!({ "email": ADMIN_EMAIL, "password": "guess" }),
        json!({ "email": "someone@example.com", "password": ADMIN_PASSWORD }),
    ];

    for attempt in attempts {
        let response = app.client.post(app.url("auth/login")).json(&attempt).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Wrong credentials");
    }
}

#[actix_rt::test]
async fn health_check_is_admin_only() {
    let app = TestApp::spawn().await;

    let anonymous = app.client.get(app.url("admin/health")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = app.admin_token().await;
    let response = app.client.get(app.url("admin/health")).bearer_auth(token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["version"].is_string());
    assert!(body["uptime"].is_string());
}

#[actix_rt::test]
async fn banner_is_public() {
    let app = TestApp::spawn().await;

    let body: Value = app.client.get(&app.address).send().await.unwrap().json().await.unwrap();

    assert_eq!(body["status"], "Ok");
    assert_eq!(body["projects"], "/api/v1/projects");
}
