mod test_utils;

use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::{sample_project, TestApp};

#[actix_rt::test]
async fn listing_an_empty_catalog_returns_the_envelope() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("projects")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[actix_rt::test]
async fn creating_a_project_requires_a_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("projects"))
        .json(&sample_project("Atlas"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.repo.snapshot().is_empty());
}

#[actix_rt::test]
async fn forged_tokens_are_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("projects"))
        .bearer_auth("not.a.jwt")
        .json(&sample_project("Atlas"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[actix_rt::test]
async fn admin_creates_and_reads_back_a_project() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("projects"))
        .bearer_auth(&token)
        .json(&sample_project("Atlas"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Atlas");
    assert_eq!(created["technologies"], json!(["Go", "Kafka", "Go"]));
    assert_eq!(created["live_url"], Value::Null);
    assert_eq!(created["created_at"], created["updated_at"]);

    let detail: Value = app
        .client
        .get(app.url(&format!("projects/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(detail["id"], id);
    assert!(detail["readme_content"].as_str().unwrap().starts_with("# Atlas"));
    assert!(detail["readme_html"].as_str().unwrap().contains("<h1>Atlas</h1>"));
}

#[actix_rt::test]
async fn blank_name_is_a_validation_error() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let mut project = sample_project("Atlas");
    project["name"] = json!("   ");

    let response = app
        .client
        .post(app.url("projects"))
        .bearer_auth(&token)
        .json(&project)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].as_array().is_some_and(|d| !d.is_empty()));
}

#[actix_rt::test]
async fn malformed_json_answers_with_an_error_body() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .post(app.url("projects"))
        .bearer_auth(&token)
        .header("Content-Type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("JSON payload error"));
}

#[actix_rt::test]
async fn update_merges_fields_and_bumps_updated_at() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let existing = app.insert_project("Atlas").await;

    let response = app
        .client
        .put(app.url(&format!("projects/{}", existing.id)))
        .bearer_auth(&token)
        .json(&json!({ "short_description": "Now with dashboards", "is_featured": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Project updated successfully");

    let stored = app.repo.snapshot().remove(0);
    assert_eq!(stored.name, "Atlas");
    assert_eq!(stored.short_description, "Now with dashboards");
    assert!(stored.is_featured);
    assert_eq!(stored.created_at, existing.created_at);
    assert!(stored.updated_at >= existing.updated_at);
}

#[actix_rt::test]
async fn updating_a_missing_project_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app
        .client
        .patch(app.url("projects/404"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn delete_removes_once_then_reports_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let existing = app.insert_project("Atlas").await;
    let path = app.url(&format!("projects/{}", existing.id));

    let first = app.client.delete(&path).bearer_auth(&token).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["message"], "Project deleted successfully");

    let second = app.client.delete(&path).bearer_auth(&token).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    let read = app.client.get(&path).send().await.unwrap();
    assert_eq!(read.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn listing_keeps_insertion_order_and_applies_filters() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    app.insert_project("First").await;
    app.client
        .post(app.url("projects"))
        .bearer_auth(&token)
        .json(&sample_project("Second"))
        .send()
        .await
        .unwrap();
    app.insert_project("Third").await;

    let all: Value = app.client.get(app.url("projects")).send().await.unwrap().json().await.unwrap();
    let names: Vec<&str> = all["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);

    let go: Value = app
        .client
        .get(app.url("projects?technology=go"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(go["count"], 1);
    assert_eq!(go["data"][0]["name"], "Second");

    let featured: Value = app
        .client
        .get(app.url("projects/featured?limit=2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(featured["count"], 2);
    assert_eq!(featured["data"][0]["name"], "Second");
    assert_eq!(featured["data"][1]["name"], "First");
}

#[actix_rt::test]
async fn non_numeric_project_id_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("projects/atlas")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path parameter"));
}

#[actix_rt::test]
async fn trailing_slashes_are_normalized() {
    let app = TestApp::spawn().await;
    app.insert_project("Atlas").await;

    let response = app.client.get(app.url("projects/")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 1);
}
