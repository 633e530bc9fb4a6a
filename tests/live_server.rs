//! Tests against a running server
//!
//! Start the server first, then run with: cargo test -- --ignored

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_check() {
    let response = client()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_create_genre_redirects_to_detail() {
    let client = client();
    let name = format!("Genre{}", std::process::id());

    let response = client
        .post(format!("{}/catalog/genre/create", BASE_URL))
        .form(&[("name", name.as_str())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()["location"]
        .to_str()
        .expect("Invalid location")
        .to_string();

    let body: Value = client
        .get(format!("{}{}", BASE_URL, location))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["view"], "genreDetail");
    assert_eq!(body["data"]["genre"]["name"], name.as_str());

    let response = client
        .post(format!("{}{}/delete", BASE_URL, location))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore]
async fn test_unknown_author_is_not_found() {
    let response = client()
        .get(format!(
            "{}/catalog/author/00000000-0000-4000-8000-000000000000",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
