mod test_utils;

use std::sync::Arc;

use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};
use test_utils::{CapturingRelay, Collaborators, TestApp, OWNER_EMAIL};

fn contact_form() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "subject": "Collaboration",
        "message": "I would like to talk about your catalog project."
    })
}

#[actix_rt::test]
async fn contact_without_relay_falls_back_to_mailto() {
    let app = TestApp::spawn().await;

    let response = app.client.post(app.url("contact")).json(&contact_form()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fallback"], true);
    assert_eq!(body["message"], "Email service not configured. Opening email client...");
    assert!(body["mailto"].as_str().unwrap().starts_with(&format!("mailto:{OWNER_EMAIL}?subject=")));
}

#[actix_rt::test]
async fn contact_is_relayed_to_the_owner() {
    let relay = Arc::new(CapturingRelay::default());
    let app = TestApp::spawn_with(Collaborators { relay: Some(relay.clone()), storage: false }).await;

    let response = app.client.post(app.url("contact")).json(&contact_form()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email sent successfully");
    assert_eq!(body["fallback"], false);

    let sent = relay.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, OWNER_EMAIL);
    assert_eq!(sent[0].reply_to, "ada@example.com");
    assert!(sent[0].subject.ends_with("Collaboration"));
}

#[actix_rt::test]
async fn rejected_relay_credentials_fall_back_to_mailto() {
    let relay = Arc::new(CapturingRelay { reject_credentials: true, ..Default::default() });
    let app = TestApp::spawn_with(Collaborators { relay: Some(relay), storage: false }).await;

    let body: Value = app
        .client
        .post(app.url("contact"))
        .json(&contact_form())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["fallback"], true);
    assert_eq!(body["message"], "Email service unavailable. Opening email client...");
}

#[actix_rt::test]
async fn invalid_contact_form_is_rejected() {
    let app = TestApp::spawn().await;
    let mut form = contact_form();
    form["email"] = json!("not-an-email");

    let response = app.client.post(app.url("contact")).json(&form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn contact_submissions_are_rate_limited_per_client() {
    let app = TestApp::spawn().await;
    let limit = app.config.contact_limit_per_hour;

    for _ in 0..limit {
        let response = app.client.post(app.url("contact")).json(&contact_form()).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.client.post(app.url("contact")).json(&contact_form()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 3600);
}

fn png_part() -> multipart::Part {
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    multipart::Part::bytes(png).file_name("shot.png")
}

#[actix_rt::test]
async fn media_upload_requires_admin() {
    let app = TestApp::spawn_with(Collaborators { relay: None, storage: true }).await;

    let form = multipart::Form::new().part("file", png_part());
    let response = app.client.post(app.url("media")).multipart(form).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn media_upload_without_storage_is_unavailable() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let form = multipart::Form::new().part("file", png_part());
    let response = app
        .client
        .post(app.url("media"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn media_upload_returns_the_public_url() {
    let app = TestApp::spawn_with(Collaborators { relay: None, storage: true }).await;
    let token = app.admin_token().await;

    let form = multipart::Form::new()
        .part("file", png_part())
        .text("folder", "thumbnails");
    let body: Value = app
        .client
        .post(app.url("media"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["url"], "https://cdn.example.com/thumbnails/shot.png");
    assert_eq!(body["resource_type"], "image");
    assert_eq!(body["bytes"], 12);
}
