use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wedgallery::{
    base_path::BasePath,
    blob_store::DiskBlobBackend,
    config::{AdminConfig, BlobstoreConfig, LoggingConfig, ServerConfig, ServiceConfig, StorageConfig},
    db,
    doc_store::SqliteDocumentStore,
    server, AppContext,
};

const TOKEN: &str = "test-admin-token-0123456789";
// Smallest PNG header image::guess_format recognizes
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

async fn test_app(base: &str) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 0,
            base_path: BasePath::new(base),
            max_upload_bytes: 1024 * 1024,
        },
        storage: StorageConfig {
            data_directory: dir.path().to_path_buf(),
            database: PathBuf::from(":memory:"),
            blobstore: BlobstoreConfig::Disk {
                location: dir.path().join("blobs"),
            },
        },
        admin: AdminConfig {
            token: TOKEN.to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            json: false,
        },
    };

    let pool = db::create_memory_pool().await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let documents = Arc::new(SqliteDocumentStore::new(pool.clone()));
    let blobs = Arc::new(DiskBlobBackend::new(dir.path().join("blobs")));

    let ctx = AppContext::from_parts(config, pool, documents, blobs);
    (server::build_router(ctx), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn admin(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN))
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

async fn create_gallery(app: &Router, prefix: &str) -> String {
    let (status, body) = send(
        app,
        admin(
            "POST",
            &format!("{}api/admin/galleries", prefix),
            json_body(json!({
                "code": "anna-ben",
                "name": "Anna & Ben",
                "password": "bouquet",
                "location": "Lake Como"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("passwordHash").is_none());
    body["id"].as_str().unwrap().to_string()
}

async fn upload(app: &Router, prefix: &str, gallery_id: &str, name: &str) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "{}api/admin/galleries/{}/photos?name={}",
            prefix, gallery_id, name
        ))
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::from(PNG.to_vec()))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn routes_are_mounted_under_base_path() {
    let (app, _dir) = test_app("/wedgallery/").await;

    let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

    let (status, body) = send(&app, get("/wedgallery/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["basePath"], "/wedgallery/");

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_token() {
    let (app, _dir) = test_app("/").await;

    let request = Request::builder()
        .uri("/api/admin/galleries")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthenticationRequired");
}

#[tokio::test]
async fn upload_and_delete_photo() {
    let (app, dir) = test_app("/wedgallery/").await;
    let prefix = "/wedgallery/";
    let gallery_id = create_gallery(&app, prefix).await;

    let photo = upload(&app, prefix, &gallery_id, "vows.png").await;
    let photo_id = photo["id"].as_str().unwrap().to_string();
    assert_eq!(photo["contentType"], "image/png");
    assert_eq!(
        photo["url"],
        format!("/wedgallery/media/gallery-photos/{}/vows.png", gallery_id)
    );
    let stored = dir
        .path()
        .join("blobs/gallery-photos")
        .join(&gallery_id)
        .join("vows.png");
    assert!(stored.exists());

    // Same name in the same gallery is refused
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "{}api/admin/galleries/{}/photos?name=vows.png",
            prefix, gallery_id
        ))
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::from(PNG.to_vec()))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, gallery) = send(
        &app,
        admin("GET", &format!("{}api/admin/galleries/{}", prefix, gallery_id), Body::empty()),
    )
    .await;
    assert_eq!(gallery["photoCount"], 1);

    // Without confirmation nothing happens
    let delete_uri = format!(
        "{}api/admin/galleries/{}/photos/{}?name=vows.png",
        prefix, gallery_id, photo_id
    );
    let (status, body) = send(&app, admin("DELETE", &delete_uri, Body::empty())).await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    assert!(body["message"].as_str().unwrap().contains("vows.png"));
    assert!(stored.exists());

    let (status, report) = send(
        &app,
        admin("DELETE", &format!("{}&confirm=true", delete_uri), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["photoId"], photo_id);
    assert_eq!(report["indexRecordsRemoved"], 1);
    assert_eq!(
        report["blobKey"],
        format!("gallery-photos/{}/vows.png", gallery_id)
    );
    assert!(!stored.exists());

    let (_, photos) = send(
        &app,
        admin(
            "GET",
            &format!("{}api/admin/galleries/{}/photos", prefix, gallery_id),
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(photos, json!([]));

    let (_, gallery) = send(
        &app,
        admin("GET", &format!("{}api/admin/galleries/{}", prefix, gallery_id), Body::empty()),
    )
    .await;
    assert_eq!(gallery["photoCount"], 0);

    // Deleting again reports the missing canonical record
    let (status, _) = send(
        &app,
        admin("DELETE", &format!("{}&confirm=true", delete_uri), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn guest_unlocks_gallery_and_requests_password() {
    let (app, _dir) = test_app("/").await;
    let gallery_id = create_gallery(&app, "/").await;
    upload(&app, "/", &gallery_id, "first-dance.png").await;

    let unlock = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/galleries/anna-ben/unlock")
            .header("content-type", "application/json")
            .body(json_body(json!({ "password": password })))
            .unwrap()
    };

    let (status, body) = send(&app, unlock("bouquet")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gallery"]["code"], "anna-ben");
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);
    assert_eq!(body["photos"][0]["url"], format!("/media/gallery-photos/{}/first-dance.png", gallery_id));

    let (status, _) = send(&app, unlock("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/galleries/anna-ben/password-requests")
        .header("content-type", "application/json")
        .body(json_body(json!({
            "firstName": "Maria",
            "lastName": "Rossi",
            "email": "maria@example.com",
            "relation": "Cousin of the bride"
        })))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");

    let (status, body) = send(
        &app,
        admin("GET", "/api/admin/password-requests?status=pending", Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let media = Request::builder()
        .uri(format!("/media/gallery-photos/{}/first-dance.png", gallery_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(media).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
}

#[tokio::test]
async fn chapters_order_photos() {
    let (app, _dir) = test_app("/").await;
    let gallery_id = create_gallery(&app, "/").await;
    let photo = upload(&app, "/", &gallery_id, "cake.png").await;
    upload(&app, "/", &gallery_id, "arrival.png").await;

    let (status, chapter) = send(
        &app,
        admin(
            "POST",
            &format!("/api/admin/galleries/{}/chapters", gallery_id),
            json_body(json!({ "title": "Reception" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chapter["position"], 0);
    let chapter_id = chapter["id"].as_str().unwrap();

    let (status, assigned) = send(
        &app,
        admin(
            "PUT",
            &format!(
                "/api/admin/galleries/{}/photos/{}/chapter",
                gallery_id,
                photo["id"].as_str().unwrap()
            ),
            json_body(json!({ "chapterId": chapter_id, "position": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["chapterId"], chapter_id);

    let (_, photos) = send(
        &app,
        admin("GET", &format!("/api/admin/galleries/{}/photos", gallery_id), Body::empty()),
    )
    .await;
    assert_eq!(photos[0]["name"], "cake.png");

    let (status, body) = send(
        &app,
        admin(
            "DELETE",
            &format!("/api/admin/galleries/{}/chapters/{}", gallery_id, chapter_id),
            Body::empty(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unassignedPhotos"], 1);
}
