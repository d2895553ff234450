//! HTTP 接口的集成测试。

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt;

use lyrics_resolver_rs::{
    LyricsResolver, MusicRelation, SearchRequest,
    cache::CacheGateway,
    providers::Provider,
    server::{AppState, build_router},
};

/// 固定返回一条结果的提供商，记录被调用的次数。
struct FixedProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl Provider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn resolve(&self, request: &SearchRequest) -> Vec<MusicRelation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        vec![MusicRelation {
            title: request.title.clone(),
            artist: request.artist.clone(),
            external_id: request.external_id.clone(),
            provider_track_id: "003aAYrm3GE0Ac".into(),
            lyrics_body: "W3RpOueou+mmmV0=".into(),
            translated_lyrics_body: None,
            source_name: "QQ Music".into(),
            offset_millis: 0,
        }]
    }
}

struct TestApp {
    _dir: TempDir,
    router: Router,
    provider: Arc<FixedProvider>,
}

async fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheGateway::open(dir.path().join("lyrics.db")).await.unwrap();
    let provider = Arc::new(FixedProvider {
        calls: AtomicUsize::new(0),
    });
    let resolver = LyricsResolver::new(vec![provider.clone()], cache);
    TestApp {
        _dir: dir,
        router: build_router(AppState::new(resolver)),
        provider,
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn call(app: &TestApp, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(post_json(uri, body))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lookup_returns_envelope_and_caches() {
    let app = setup_app().await;
    let body = r#"{"name": "稻香", "singer": "周杰伦", "id": "abc123"}"#;

    let (status, first) = call(&app, "/api/v1/lyrics", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["code"], 0);
    assert_eq!(first["message"], "success");
    assert_eq!(first["data"][0]["externalId"], "abc123");
    assert_eq!(first["data"][0]["providerTrackId"], "003aAYrm3GE0Ac");

    let (_, second) = call(&app, "/api/v1/lyrics", body).await;
    assert_eq!(second["data"], first["data"]);
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_force_refresh_calls_providers_again() {
    let app = setup_app().await;

    call(&app, "/api/v1/lyrics", r#"{"title": "稻香", "artist": "周杰伦", "externalId": "abc123"}"#).await;
    call(
        &app,
        "/api/v1/lyrics",
        r#"{"title": "稻香", "artist": "周杰伦", "externalId": "abc123", "forceRefresh": true}"#,
    )
    .await;

    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_confirm_then_offset() {
    let app = setup_app().await;
    let relation = json!({
        "title": "稻香",
        "artist": "周杰伦",
        "externalId": "xyz",
        "providerTrackId": "185809",
        "lyricsBody": "bHlyaWNz",
        "sourceName": "NetEase Music"
    });

    let (status, confirmed) = call(&app, "/api/v1/lyrics/confirm", &relation.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed, json!({"code": 0, "message": "success"}));

    let (status, adjusted) = call(
        &app,
        "/api/v1/lyrics/offset",
        r#"{"sid": "xyz", "lid": "185809", "offset": 1500}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["code"], 0);

    let (_, cached) = call(
        &app,
        "/api/v1/lyrics",
        r#"{"title": "稻香", "artist": "周杰伦", "externalId": "xyz"}"#,
    )
    .await;
    assert_eq!(cached["data"][0]["offsetMillis"], 1500);
    assert_eq!(cached["data"][0]["sourceName"], "NetEase Music");
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_offset_for_unknown_entry_fails() {
    let app = setup_app().await;

    let (status, body) = call(
        &app,
        "/api/v1/lyrics/offset",
        r#"{"externalId": "missing", "relationId": "mid", "offset": 10}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert!(body["message"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body_is_reported() {
    let app = setup_app().await;

    let (status, body) = call(&app, "/api/v1/lyrics", "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500);
    assert_eq!(app.provider.calls.load(Ordering::SeqCst), 0);
}
