use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use copa_storage::{
    Blob, RemoteBlobGateway, StorageBackend, StorageError, StorageGateway, UploadOptions,
};
use serde_json::{json, Value};

const TOKEN: &str = "test-token";

#[derive(Default)]
struct FakeStore {
    objects: Vec<(String, Vec<u8>)>,
    headers: Vec<HashMap<String, String>>,
    deleted: Vec<String>,
}

type Shared = Arc<Mutex<FakeStore>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

async fn put_object(
    State(store): State<Shared>,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::FORBIDDEN);
    }
    let mut store = store.lock().unwrap();
    store.headers.push(
        headers
            .iter()
            .filter(|(name, _)| name.as_str().starts_with("x-"))
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap().to_string()))
            .collect(),
    );
    store.objects.push((path.clone(), body.to_vec()));
    Ok(Json(json!({
        "url": format!("https://blob.test/{path}"),
        "pathname": path,
    })))
}

async fn delete_objects(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::FORBIDDEN;
    }
    let urls: Vec<String> = serde_json::from_value(body["urls"].clone()).unwrap();
    if urls.iter().any(|url| url.contains("broken")) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    store.lock().unwrap().deleted.extend(urls);
    StatusCode::OK
}

async fn list_objects(
    State(store): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = store.lock().unwrap();
    let prefix = query.get("prefix").cloned().unwrap_or_default();
    let matching: Vec<_> = store
        .objects
        .iter()
        .filter(|(path, _)| path.starts_with(&prefix))
        .collect();
    // one object per page to exercise the cursor loop
    let index: usize = query
        .get("cursor")
        .map(|cursor| cursor.parse().unwrap())
        .unwrap_or(0);
    let page: Vec<Value> = matching
        .get(index)
        .map(|(path, data)| {
            json!({
                "url": format!("https://blob.test/{path}"),
                "pathname": path,
                "size": data.len(),
                "uploadedAt": "2024-05-01T10:00:00.000Z",
            })
        })
        .into_iter()
        .collect();
    let has_more = index + 1 < matching.len();
    Json(json!({
        "blobs": page,
        "cursor": has_more.then(|| (index + 1).to_string()),
        "hasMore": has_more,
    }))
}

async fn spawn_fake_blob_api() -> (String, Shared) {
    let store: Shared = Arc::default();
    let app = Router::new()
        .route("/", get(list_objects))
        .route("/delete", post(delete_objects))
        .route("/*path", put(put_object))
        .with_state(store.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), store)
}

#[tokio::test]
async fn upload_list_and_delete_against_blob_api() {
    let (api, store) = spawn_fake_blob_api().await;
    let gateway = StorageBackend::Remote(RemoteBlobGateway::new(&api, Some(TOKEN.into())));
    assert_eq!(gateway.kind(), "blob");

    let blob = Blob::new("a.png", "image/png", b"png".to_vec());
    let url = gateway
        .upload(&blob, "banners/a.png", UploadOptions::default())
        .await
        .unwrap();
    assert_eq!(url, "https://blob.test/banners/a.png");
    gateway
        .upload(&blob, "banners/b.png", UploadOptions::default())
        .await
        .unwrap();
    gateway
        .upload(&blob, "sponsors/c.png", UploadOptions::default())
        .await
        .unwrap();

    {
        let store = store.lock().unwrap();
        let headers = &store.headers[0];
        assert_eq!(headers["x-content-type"], "image/png");
        assert_eq!(headers["x-add-random-suffix"], "0");
        assert_eq!(headers["x-cache-control-max-age"], "31536000");
    }

    let listed = gateway.list("banners/").await.unwrap();
    let paths: Vec<_> = listed.iter().map(|o| o.pathname.as_str()).collect();
    assert_eq!(paths, vec!["banners/a.png", "banners/b.png"]);
    assert_eq!(listed[0].size, 3);

    gateway.delete(&url).await.unwrap();
    assert_eq!(store.lock().unwrap().deleted, vec![url]);
}

#[tokio::test]
async fn missing_token_fails_on_first_use() {
    let (api, store) = spawn_fake_blob_api().await;
    let gateway = RemoteBlobGateway::new(&api, None);
    let blob = Blob::new("a.png", "image/png", vec![1]);

    assert_eq!(
        gateway
            .upload(&blob, "banners/a.png", UploadOptions::default())
            .await,
        Err(StorageError::MissingToken)
    );
    assert_eq!(gateway.list("").await, Err(StorageError::MissingToken));
    assert!(store.lock().unwrap().objects.is_empty());
}

#[tokio::test]
async fn protected_placeholder_is_refused_before_any_request() {
    let (api, store) = spawn_fake_blob_api().await;
    let gateway = RemoteBlobGateway::new(&api, Some(TOKEN.into()));

    assert!(matches!(
        gateway.delete("https://blob.test/equipos/sin-logo.jpg").await,
        Err(StorageError::Protected(_))
    ));
    assert!(store.lock().unwrap().deleted.is_empty());
}

#[tokio::test]
async fn backend_failures_carry_status() {
    let (api, _store) = spawn_fake_blob_api().await;
    let gateway = RemoteBlobGateway::new(&api, Some("wrong-token".into()));
    let blob = Blob::new("a.png", "image/png", vec![1]);

    match gateway
        .upload(&blob, "banners/a.png", UploadOptions::default())
        .await
    {
        Err(StorageError::Upload(message)) => assert!(message.contains("403")),
        other => panic!("unexpected result: {other:?}"),
    }

    let gateway = RemoteBlobGateway::new(&api, Some(TOKEN.into()));
    assert!(matches!(
        gateway.delete("https://blob.test/broken.png").await,
        Err(StorageError::Delete(_))
    ));
}
