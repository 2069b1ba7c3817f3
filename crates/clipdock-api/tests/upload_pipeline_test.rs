//! End-to-end tests for the upload endpoints against the real router with
//! in-memory backends. Requests are hand-built multipart bodies driven
//! through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use clipdock_api::auth::jwt::create_token;
use clipdock_api::setup::routes::setup_routes;
use clipdock_api::state::AppState;
use clipdock_core::models::Video;
use clipdock_core::{Config, StorageBackendKind};
use clipdock_db::{InMemoryVideoStore, MetadataStore};
use clipdock_storage::MemoryStorage;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const JWT_SECRET: &str = "integration-test-secret";
const BASE_URL: &str = "http://localhost:8091";
const BOUNDARY: &str = "clipdock-int-boundary";

struct TestApp {
    router: Router,
    store: InMemoryVideoStore,
    storage: MemoryStorage,
}

fn test_app() -> TestApp {
    let config = Config::for_tests(
        JWT_SECRET,
        StorageBackendKind::Memory,
        BASE_URL,
        1024, // thumbnails capped small so oversize cases stay cheap
        1 << 20,
    );

    let store = InMemoryVideoStore::new();
    let storage = MemoryStorage::new(BASE_URL.to_string());

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(store.clone()),
        Arc::new(storage.clone()),
        Some(storage.clone()),
    ));

    let router = setup_routes(&config, state).expect("router setup");

    TestApp {
        router,
        store,
        storage,
    }
}

fn token_for(user_id: Uuid) -> String {
    create_token(user_id, JWT_SECRET, 1).unwrap()
}

fn multipart_body(content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(
    path: &str,
    token: Option<&str>,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(path).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(multipart_body(content_type, data)))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn seed(app: &TestApp) -> (Uuid, Video) {
    let owner = Uuid::new_v4();
    let video = app.store.seed(owner, "launch teaser");
    (owner, video)
}

#[tokio::test]
async fn thumbnail_upload_round_trip() {
    let app = test_app();
    let (owner, video) = seed(&app);

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        Some(&token_for(owner)),
        "image/png",
        b"fake png bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    let thumbnail_url = json["thumbnail_url"].as_str().expect("thumbnail url set");
    assert!(thumbnail_url.ends_with(&format!("/videos/{}/raw", video.id)));
    assert!(json["video_url"].is_null());

    // The record was committed and the payload is retrievable from the raw route.
    let persisted = app.store.get_video(video.id).await.unwrap().unwrap();
    assert_eq!(persisted.thumbnail_url.as_deref(), Some(thumbnail_url));

    let raw = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v0/videos/{}/raw", video.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(raw.status(), StatusCode::OK);
    assert_eq!(
        raw.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let raw_bytes = axum::body::to_bytes(raw.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&raw_bytes[..], b"fake png bytes");
}

#[tokio::test]
async fn video_upload_round_trip() {
    let app = test_app();
    let (owner, video) = seed(&app);
    let payload = vec![9u8; 256 * 1024];

    let request = upload_request(
        &format!("/api/v0/videos/{}/media", video.id),
        Some(&token_for(owner)),
        "video/mp4",
        &payload,
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert!(json["video_url"].as_str().is_some());
    assert!(json["thumbnail_url"].is_null());

    let object = app.storage.get(video.id).await.unwrap();
    assert_eq!(object.data.len(), payload.len());
    assert_eq!(object.media_type, "video/mp4");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app();
    let (_owner, video) = seed(&app);

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        None,
        "image/png",
        b"fake png bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = response_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(app.storage.get(video.id).await.is_none());
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let app = test_app();
    let (owner, video) = seed(&app);
    let forged = create_token(owner, "wrong-secret", 1).unwrap();

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        Some(&forged),
        "image/png",
        b"fake png bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_owner_is_forbidden_and_nothing_is_stored() {
    let app = test_app();
    let (_owner, video) = seed(&app);

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        Some(&token_for(Uuid::new_v4())),
        "image/png",
        b"fake png bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(app.storage.get(video.id).await.is_none());
    let persisted = app.store.get_video(video.id).await.unwrap().unwrap();
    assert!(persisted.thumbnail_url.is_none());
}

#[tokio::test]
async fn wrong_media_type_is_rejected_without_storage_write() {
    let app = test_app();
    let (owner, video) = seed(&app);

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        Some(&token_for(owner)),
        "application/pdf",
        b"%PDF-1.4",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["code"], "INVALID_MEDIA_TYPE");
    assert!(app.storage.get(video.id).await.is_none());
}

#[tokio::test]
async fn webm_video_is_rejected() {
    let app = test_app();
    let (owner, video) = seed(&app);

    let request = upload_request(
        &format!("/api/v0/videos/{}/media", video.id),
        Some(&token_for(owner)),
        "video/webm",
        b"webm bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_video_is_not_found() {
    let app = test_app();

    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", Uuid::new_v4()),
        Some(&token_for(Uuid::new_v4())),
        "image/png",
        b"fake png bytes",
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_thumbnail_is_rejected() {
    let app = test_app();
    let (owner, video) = seed(&app);

    // Cap is 1024 bytes in the test config.
    let request = upload_request(
        &format!("/api/v0/videos/{}/thumbnail", video.id),
        Some(&token_for(owner)),
        "image/png",
        &vec![0u8; 4096],
    );
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.storage.get(video.id).await.is_none());
}

#[tokio::test]
async fn raw_route_for_unknown_video_is_not_found() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v0/videos/{}/raw", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reupload_replaces_previous_payload() {
    let app = test_app();
    let (owner, video) = seed(&app);

    for payload in [b"first".as_slice(), b"second".as_slice()] {
        let request = upload_request(
            &format!("/api/v0/videos/{}/thumbnail", video.id),
            Some(&token_for(owner)),
            "image/png",
            payload,
        );
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let object = app.storage.get(video.id).await.unwrap();
    assert_eq!(&object.data[..], b"second");
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
}
