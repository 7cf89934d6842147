//! Integration tests for the non-chat server surface.
//!
//! Covers the health probe, the lesson listing, credential failure
//! behavior, and static asset serving over real HTTP.

use serde_json::Value;
use tokio::net::TcpListener;
use tutor_server::{create_router, AppState, Config};

/// Starts the tutor server with the given configuration.
async fn spawn_tutor(config: Config) -> String {
    let router = create_router(AppState::new(config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

/// Tests the health probe.
#[tokio::test]
async fn test_health_endpoint() {
    let tutor = spawn_tutor(Config::default()).await;

    let response = reqwest::get(format!("{tutor}/health")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"ok": true}));
}

/// Tests the lesson listing: every catalog lesson is present with its
/// title and summary, and no seed text is exposed.
#[tokio::test]
async fn test_lessons_endpoint_strips_seeds() {
    let tutor = spawn_tutor(Config::default()).await;

    let response = reqwest::get(format!("{tutor}/lessons.json")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let raw = response.text().await.unwrap();
    let listing: Value = serde_json::from_str(&raw).unwrap();
    let map = listing.as_object().unwrap();

    let catalog = tutor_lessons::Catalog::builtin();
    assert_eq!(map.len(), catalog.lessons().count());

    for lesson in catalog.lessons() {
        let entry = map.get(lesson.id).unwrap();
        assert_eq!(entry["title"], lesson.title);
        assert_eq!(entry["summary"], lesson.summary);
        assert!(!raw.contains(lesson.seed), "seed for {} leaked", lesson.id);
    }
}

/// Tests that a server without a credential stays up and answers chat
/// requests with a descriptive error.
#[tokio::test]
async fn test_chat_without_credential() {
    let tutor = spawn_tutor(Config::default()).await;

    let response = reqwest::Client::new()
        .post(format!("{tutor}/chat"))
        .json(&serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
        .send()
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));

    // The rest of the server is unaffected.
    let health = reqwest::get(format!("{tutor}/health")).await.unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);
}

/// Tests static asset serving through the fallback service.
#[tokio::test]
async fn test_static_assets_served_from_configured_dir() {
    let static_dir = std::env::temp_dir().join(format!("tutor-static-{}", std::process::id()));
    std::fs::create_dir_all(&static_dir).unwrap();
    std::fs::write(
        static_dir.join("index.html"),
        "<html><body>Excel Tutor</body></html>",
    )
    .unwrap();

    let config = Config {
        static_dir: static_dir.to_string_lossy().to_string(),
        ..Config::default()
    };
    let tutor = spawn_tutor(config).await;

    // The root path serves index.html.
    let response = reqwest::get(format!("{tutor}/")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Excel Tutor"));

    // Unknown assets are a plain 404.
    let response = reqwest::get(format!("{tutor}/missing.css")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&static_dir);
}
