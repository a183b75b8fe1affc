use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::Service;
use uuid::Uuid;

const BOUNDARY: &str = "copa-test-boundary";

async fn setup_test_app_with_limit(max_body_bytes: usize) -> (Arc<AppState>, Router, TempDir) {
    let temp = TempDir::new().expect("tempdir");
    let db_path = temp.path().join(format!("db-{}.sqlite", Uuid::new_v4()));
    let db_url = format!("sqlite://{}", db_path.display());
    let db = Database::connect(&db_url).await.expect("db");

    let root = temp.path().join("static");
    std::fs::create_dir_all(&root).expect("static root");
    let storage = StorageBackend::Local(LocalFsGateway::new(root.clone(), "/"));

    let state = Arc::new(AppState {
        cms: CmsService::new(db, Arc::new(storage)),
        max_body_bytes,
        static_root: Some(root),
    });
    let router = build_router(state.clone());
    (state, router, temp)
}

async fn setup_test_app() -> (Arc<AppState>, Router, TempDir) {
    setup_test_app_with_limit(mi_bytes(12)).await
}

async fn send(
    router: &mut Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = router.call(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

/// Builds a multipart body. Parts with a file name are sent as files.
fn multipart(uri: &str, parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((file_name, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn call_json(router: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.call(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Organizer, tournament and one sport; returns the sport id.
async fn seed_sport(router: &mut Router) -> String {
    let (status, _) = send(
        router,
        "POST",
        "/api/admin/organizador",
        Some(json!({
            "nombre": "Asociación Deportiva",
            "celularWhatsapp": "+54 9 379 400 0000",
            "cbu": "0000003100012345678901",
            "alias": "copa.litoral"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, tournament) = send(
        router,
        "POST",
        "/api/admin/torneo",
        Some(json!({
            "nombre": "Copa del Litoral",
            "descripcion": "Torneo mixto",
            "fundamentacionTitulo": "Por qué jugamos"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, sport) = send(
        router,
        "POST",
        "/api/admin/deportes",
        Some(json!({ "nombre": "Vóley", "torneoId": tournament["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    sport["id"].as_str().expect("sport id").to_string()
}

#[tokio::test]
async fn sponsor_lifecycle_over_http() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let (status, created) = send(
        &mut router,
        "POST",
        "/api/admin/sponsors",
        Some(json!({ "nombre": "Acme", "urlImage": "/sponsors/acme.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["nombre"], "Acme");
    assert_eq!(created["redesNombre"], "");
    let id = created["id"].as_str().expect("id").to_string();

    let (status, listed) = send(&mut router, "GET", "/api/sponsors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/admin/sponsors/{id}");
    let (status, _) = send(&mut router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&mut router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("sponsor"));
}

#[tokio::test]
async fn missing_fields_are_reported_as_bad_request() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let (status, body) = send(&mut router, "POST", "/api/admin/sponsors", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("nombre is required"));
    assert!(message.contains("urlImage is required"));
}

#[tokio::test]
async fn second_organizer_is_rejected() {
    let (_state, mut router, _tmp) = setup_test_app().await;
    seed_sport(&mut router).await;

    let (status, body) = send(
        &mut router,
        "POST",
        "/api/admin/organizador",
        Some(json!({
            "nombre": "Otra",
            "celularWhatsapp": "1",
            "cbu": "2",
            "alias": "otra"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, stats) = send(&mut router, "GET", "/api/admin/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["organizadores"], 1);
    assert_eq!(stats["deportes"], 1);
}

#[tokio::test]
async fn podium_placement_is_unique_per_sport() {
    let (_state, mut router, _tmp) = setup_test_app().await;
    let sport_id = seed_sport(&mut router).await;

    let entry = json!({ "equipoNombre": "Zorros", "puesto": 1, "deporteId": sport_id });
    let (status, _) = send(&mut router, "POST", "/api/admin/podios", Some(entry)).await;
    assert_eq!(status, StatusCode::CREATED);

    let rival = json!({ "equipoNombre": "Aguilas", "puesto": 1, "deporteId": sport_id });
    let (status, body) = send(&mut router, "POST", "/api/admin/podios", Some(rival)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already taken"));

    let uri = format!("/api/admin/podios?deporteId={sport_id}");
    let (status, listed) = send(&mut router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["equipoNombre"], "Zorros");

    let (status, page) = send(&mut router, "GET", &format!("/api/deportes/{sport_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["deporte"]["nombre"], "Vóley");
    assert_eq!(page["torneo"]["nombre"], "Copa del Litoral");
    assert_eq!(page["podios"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn banner_upload_is_stored_and_served() {
    let (_state, mut router, tmp) = setup_test_app().await;
    let png = b"\x89PNG\r\n\x1a\nnot-really-a-png";

    let request = multipart(
        "/api/admin/upload-banner",
        &[("file", Some(("portada.png", "image/png")), &png[..])],
    );
    let (status, body) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/banners/"));
    assert!(url.ends_with(".png"));

    let filename = body["filename"].as_str().unwrap();
    assert!(tmp.path().join("static/banners").join(filename).exists());

    let (status, images) = send(&mut router, "GET", "/api/admin/banner-images", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(images[0]["url"], url.as_str());

    let response = router
        .call(Request::get(url.as_str()).body(Body::empty()).unwrap())
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(served.as_ref(), png);
}

#[tokio::test]
async fn upload_rejects_wrong_type() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let request = multipart(
        "/api/admin/upload-banner",
        &[("file", Some(("setup.exe", "application/x-msdownload")), &b"MZ"[..])],
    );
    let (status, body) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not allowed"));

    let request = multipart("/api/admin/upload-banner", &[("other", None, &b"x"[..])]);
    let (status, body) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "file is required");
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let (_state, mut router, _tmp) = setup_test_app_with_limit(1024).await;

    let data = vec![0u8; 8 * 1024];
    let request = multipart(
        "/api/admin/upload-sponsor",
        &[("file", Some(("logo.png", "image/png")), data.as_slice())],
    );
    let response = router.call(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn sport_documents_need_an_existing_sport() {
    let (_state, mut router, _tmp) = setup_test_app().await;
    let sport_id = seed_sport(&mut router).await;

    let request = multipart(
        "/api/admin/upload",
        &[
            ("file", Some(("reglamento.pdf", "application/pdf")), &b"%PDF-1.4"[..]),
            ("type", None, &b"reglamento"[..]),
        ],
    );
    let (status, _) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = Uuid::new_v4().to_string();
    let request = multipart(
        "/api/admin/upload",
        &[
            ("file", Some(("reglamento.pdf", "application/pdf")), &b"%PDF-1.4"[..]),
            ("type", None, &b"reglamento"[..]),
            ("deporteId", None, unknown.as_bytes()),
        ],
    );
    let (status, _) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = multipart(
        "/api/admin/upload",
        &[
            ("file", Some(("reglamento.pdf", "application/pdf")), &b"%PDF-1.4"[..]),
            ("type", None, &b"reglamento"[..]),
            ("deporteId", None, sport_id.as_bytes()),
        ],
    );
    let (status, body) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], format!("/reglamentos/{sport_id}.pdf"));
}

#[tokio::test]
async fn placeholder_logo_cannot_be_deleted() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let (status, body) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({ "fileUrl": "/equipos/sin-logo.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("protected"));

    let (status, _) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({ "fileUrl": "/banners/missing.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_file_accepts_both_keys() {
    let (_state, mut router, tmp) = setup_test_app().await;
    let logo = tmp.path().join("static/equipos/rojos.png");
    std::fs::create_dir_all(logo.parent().unwrap()).unwrap();
    std::fs::write(&logo, b"logo").unwrap();

    let (status, body) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({
            "filePath": "/equipos/sin-logo.jpg",
            "fileUrl": "/equipos/sin-logo.jpg"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("protected"));

    let (status, _) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({ "filePath": "/equipos/sin-logo.jpg", "fileUrl": "/equipos/rojos.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(logo.exists());

    let (status, _) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({ "filePath": "/equipos/rojos.png", "fileUrl": "/equipos/rojos.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!logo.exists());

    let (status, body) = send(
        &mut router,
        "DELETE",
        "/api/admin/delete-file",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fileUrl is required"));
}

#[tokio::test]
async fn wrongly_typed_json_fields_are_bad_requests() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let (status, body) = send(
        &mut router,
        "POST",
        "/api/admin/sponsors",
        Some(json!({ "nombre": 5, "urlImage": "/sponsors/acme.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("nombre"));

    let (status, body) = send(
        &mut router,
        "POST",
        "/api/admin/podios",
        Some(json!({ "equipoNombre": "Zorros", "puesto": 1, "deporteId": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::post("/api/admin/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = call_json(&mut router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn sport_delete_cascades_over_http() {
    let (_state, mut router, _tmp) = setup_test_app().await;
    let sport_id = seed_sport(&mut router).await;

    let (status, _) = send(
        &mut router,
        "POST",
        "/api/admin/equipos",
        Some(json!({ "nombre": "Zorros", "deporteId": sport_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/admin/deportes/{sport_id}");
    let (status, _) = send(&mut router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&mut router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, teams) = send(&mut router, "GET", "/api/admin/equipos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teams.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn login_checks_credentials() {
    let (state, mut router, _tmp) = setup_test_app().await;
    state
        .cms
        .create_user("admin@copa.example", "cambiar_esto")
        .await
        .expect("user");

    let (status, body) = send(
        &mut router,
        "POST",
        "/api/admin/login",
        Some(json!({ "email": "admin@copa.example", "password": "otra" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");

    let (status, body) = send(
        &mut router,
        "POST",
        "/api/admin/login",
        Some(json!({ "email": "admin@copa.example", "password": "cambiar_esto" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "admin@copa.example");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn health_reports_table_counts() {
    let (_state, mut router, _tmp) = setup_test_app().await;

    let (status, body) = send(&mut router, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["tables"]["organizadores"], 0);
}

#[test]
fn openapi_lists_admin_routes() {
    use utoipa::OpenApi;

    let doc = docs::ApiDoc::openapi();
    for path in [
        "/api/admin/sponsors/{id}",
        "/api/admin/upload",
        "/api/deportes/{id}",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    let json = serde_json::to_value(&doc).unwrap();
    let not_found = &json["paths"]["/api/admin/sponsors/{id}"]["get"]["responses"]["404"];
    assert_eq!(
        not_found["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorBody"
    );
}
