//! Integration tests for the health and admin endpoints

mod common;

use common::{spawn_app, spawn_app_on};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.starts_with("text/plain")));
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn file_server_hits_are_counted() {
    let app = spawn_app();

    for _ in 0..3 {
        let response = app
            .client
            .get(app.url("/app/index.html"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(200, response.status().as_u16());
    }

    let body = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .expect("Failed to execute request")
        .text()
        .await
        .unwrap();

    assert!(body.contains("Welcome, Chirpy Admin"));
    assert!(body.contains("visited 3 times"));
}

#[tokio::test]
async fn reset_zeroes_hits_and_deletes_users_in_dev() {
    let app = spawn_app();
    app.client.get(app.url("/app/")).send().await.unwrap();
    assert_eq!(201, app.register("a@b.com", "pw123456").await.status().as_u16());

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    let metrics = app
        .client
        .get(app.url("/admin/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("visited 0 times"));

    // The account is gone, so the email is free again
    assert_eq!(201, app.register("a@b.com", "pw123456").await.status().as_u16());
}

#[tokio::test]
async fn reset_is_forbidden_outside_dev() {
    let app = spawn_app_on("production");

    let response = app
        .client
        .post(app.url("/admin/reset"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}
