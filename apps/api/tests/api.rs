use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use site_api::auth::password::hash_password;
use site_api::config::Config;
use site_api::media::LocalStorage;
use site_api::notify::{MailError, MailTransport, OutgoingMail, Sent};
use site_api::routes::{build_router, cors_layer};
use site_api::state::AppState;
use site_api::store::{MemoryStore, Store};

const MAX_UPLOAD: usize = 64 * 1024;
const BOUNDARY: &str = "X-SITE-API-TEST-BOUNDARY";

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    fn provider(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, mail: OutgoingMail) -> Result<Sent, MailError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(mail);
        Ok(Sent {
            message_id: format!("<test-{}@example.com>", sent.len()),
        })
    }
}

struct FailingMailer;

#[async_trait]
impl MailTransport for FailingMailer {
    fn provider(&self) -> &'static str {
        "failing"
    }

    async fn send(&self, _mail: OutgoingMail) -> Result<Sent, MailError> {
        Err(MailError::Api {
            status: 422,
            message: "The from address is not verified".into(),
        })
    }
}

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    tmp: TempDir,
}

enum Mail {
    Off,
    Recording,
    Failing,
}

async fn app_with(mail: Mail, keep_resumes: bool) -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let upload_dir = tmp.path().join("uploads");
    let store = Arc::new(MemoryStore::new());
    let recorder = Arc::new(RecordingMailer::default());

    let mailer: Option<Arc<dyn MailTransport>> = match mail {
        Mail::Off => None,
        Mail::Recording => Some(recorder.clone() as Arc<dyn MailTransport>),
        Mail::Failing => Some(Arc::new(FailingMailer) as Arc<dyn MailTransport>),
    };
    let resume_archive = if keep_resumes {
        Some(Arc::new(
            LocalStorage::new(tmp.path().join("resumes"), "resumes")
                .await
                .unwrap(),
        ))
    } else {
        None
    };

    let state = AppState {
        store: store.clone(),
        media: Arc::new(LocalStorage::new(&upload_dir, "/uploads").await.unwrap()),
        mailer,
        resume_archive,
        max_upload_bytes: MAX_UPLOAD,
        public_upload_dir: Some(upload_dir),
    };

    TestApp {
        router: build_router(state),
        store,
        mailer: recorder,
        tmp,
    }
}

async fn app() -> TestApp {
    app_with(Mail::Off, false).await
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        field: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                field,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn png_part(bytes: &[u8]) -> Part<'_> {
    Part::File {
        field: "file",
        filename: "photo.png",
        content_type: "image/png",
        bytes,
    }
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
}

#[tokio::test]
async fn test_health_reports_unreachable_store() {
    let app = app().await;
    app.store.close().await;
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "unavailable");
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_created_job_is_listed_first() {
    let app = app().await;
    let (status, first) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/jobs",
            json!({"title": "Proofreader", "location": "Berlin", "description": "Read proofs"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, created) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/jobs",
            json!({"title": "Editor", "location": "Remote", "description": "Edit books"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let (status, list) = send(&app.router, get("/api/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], created["id"]);
    assert_eq!(list[1]["id"], first["id"]);
}

#[tokio::test]
async fn test_job_missing_fields_is_400() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/jobs", json!({"title": "Editor", "location": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("location"));
    assert!(message.contains("description"));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = app().await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/jobs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_job_id_is_usable_for_update_and_delete() {
    let app = app().await;
    let (_, job) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/jobs",
            json!({"title": "Editor", "location": "Remote", "description": "Edit books"}),
        ),
    )
    .await;
    let id = job["id"].as_str().unwrap();

    let (status, updated) = send(
        &app.router,
        json_request(Method::PUT, &format!("/api/jobs/{id}"), json!({"location": "Paris"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location"], "Paris");
    assert_eq!(updated["title"], "Editor");

    let (status, body) = send(&app.router, delete(&format!("/api/jobs/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Job deleted successfully");
    assert_eq!(body["id"], id);

    let (_, list) = send(&app.router, get("/api/jobs")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_id_is_404_and_malformed_id_is_400() {
    let app = app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(&app.router, delete(&format!("/api/jobs/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = send(&app.router, delete("/api/jobs/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid job ID format");

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, &format!("/api/services/{missing}"), json!({"title": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, "/api/services/42", json!({"title": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_cannot_blank_required_field() {
    let app = app().await;
    let (_, job) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/jobs",
            json!({"title": "Editor", "location": "Remote", "description": "Edit books"}),
        ),
    )
    .await;
    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/jobs/{}", job["id"].as_str().unwrap()),
            json!({"title": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_service_crud() {
    let app = app().await;
    let (status, service) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/services",
            json!({"title": "Typesetting", "description": "Print-ready layouts"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = service["id"].as_str().unwrap();

    let (status, updated) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/services/{id}"),
            json!({"description": "Print and ePub layouts"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Typesetting");
    assert_eq!(updated["description"], "Print and ePub layouts");

    let (status, body) = send(&app.router, delete(&format!("/api/services/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Service deleted successfully");
}

// ---------------------------------------------------------------------------
// Images and uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_image_without_src_is_400() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/images", json!({"category": "home"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("src"));
}

#[tokio::test]
async fn test_image_category_must_be_known() {
    let app = app().await;
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/images",
            json!({"category": "banner", "src": "https://cdn.example.com/a.jpg"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_filter_by_query_and_path() {
    let app = app().await;
    for (category, src) in [
        ("home", "https://cdn.example.com/home.jpg"),
        ("career-globe", "https://cdn.example.com/globe.jpg"),
    ] {
        let (status, image) = send(
            &app.router,
            json_request(Method::POST, "/api/images", json!({"category": category, "src": src})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image["alt"], "");
    }

    let (_, all) = send(&app.router, get("/api/images")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, by_query) = send(&app.router, get("/api/images?category=career-globe")).await;
    let by_query = by_query.as_array().unwrap();
    assert_eq!(by_query.len(), 1);
    assert_eq!(by_query[0]["category"], "career-globe");

    let (_, by_path) = send(&app.router, get("/api/images/home")).await;
    let by_path = by_path.as_array().unwrap();
    assert_eq!(by_path.len(), 1);
    assert_eq!(by_path[0]["src"], "https://cdn.example.com/home.jpg");

    let (status, unknown) = send(&app.router, get("/api/images/banner")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(unknown.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_then_delete_image_removes_file() {
    let app = app().await;
    let (status, upload) = send(
        &app.router,
        multipart_request(
            "/upload",
            &[Part::Text("category", "about"), png_part(b"\x89PNG fake")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upload["category"], "about");
    let url = upload["url"].as_str().unwrap().to_string();
    let filename = upload["filename"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/uploads/{filename}"));
    let path = app.tmp.path().join("uploads").join(&filename);
    assert!(path.exists());

    let (status, _) = send(&app.router, get(&url)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, image) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/images",
            json!({"category": "about", "src": url, "alt": "Team"}),
        ),
    )
    .await;
    let id = image["id"].as_str().unwrap();

    let (status, body) = send(&app.router, delete(&format!("/api/images/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image deleted successfully");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_deleting_remote_image_twice_is_404() {
    let app = app().await;
    let (_, image) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/images",
            json!({"category": "general", "src": "https://cdn.example.com/x.jpg"}),
        ),
    )
    .await;
    let id = image["id"].as_str().unwrap();
    let (status, _) = send(&app.router, delete(&format!("/api/images/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, delete(&format!("/api/images/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_category_defaults_to_general() {
    let app = app().await;
    let (status, upload) = send(
        &app.router,
        multipart_request("/upload", &[png_part(b"\x89PNG")]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upload["category"], "general");
}

#[tokio::test]
async fn test_upload_rejects_missing_file_wrong_type_and_oversize() {
    let app = app().await;

    let (status, body) = send(
        &app.router,
        multipart_request("/upload", &[Part::Text("category", "home")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("No file uploaded"));

    let (status, _) = send(
        &app.router,
        multipart_request(
            "/upload",
            &[Part::File {
                field: "file",
                filename: "notes.txt",
                content_type: "text/plain",
                bytes: b"hello",
            }],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let big = vec![0u8; MAX_UPLOAD + 1];
    let (status, body) = send(&app.router, multipart_request("/upload", &[png_part(&big)])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("upload limit"));

    let entries = std::fs::read_dir(app.tmp.path().join("uploads")).unwrap().count();
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn test_upload_without_multipart_is_400() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/upload", json!({"file": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unwritten_page_is_empty_map() {
    let app = app().await;
    let (status, body) = send(&app.router, get("/api/pages/about")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_page_upsert_replaces_content() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/pages/home",
            json!({"content": {"heroTitle": "Welcome", "heroSubtitle": "Books"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heroTitle"], "Welcome");

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/pages/home",
            json!({"content": {"heroTitle": "Hello"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"heroTitle": "Hello"}));

    let (_, stored) = send(&app.router, get("/api/pages/home")).await;
    assert_eq!(stored, json!({"heroTitle": "Hello"}));
}

#[tokio::test]
async fn test_page_requires_content() {
    let app = app().await;
    for payload in [json!({}), json!({"content": {}}), json!({"content": "text"})] {
        let (status, _) = send(
            &app.router,
            json_request(Method::POST, "/api/pages/home", payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_registration_is_400_and_keeps_one_record() {
    let app = app().await;
    let creds = json!({"email": "Editor@Example.com", "password": "secret123"});

    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/register", creds.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "editor@example.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "editor@example.com", "password": "another1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "User with this email already exists");
    assert_eq!(app.store.user_count("editor@example.com").await, 1);
}

#[tokio::test]
async fn test_register_validates_email_and_password() {
    let app = app().await;
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "not-an-email", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "a@example.com", "password": "123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 6"));

    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/api/register", json!({"email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_does_not_leak_account_existence() {
    let app = app().await;
    send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "admin@example.com", "password": "password"}),
        ),
    )
    .await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/login",
            json!({"email": "ADMIN@example.com", "password": "password"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "admin@example.com");

    let (wrong_status, wrong_body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/login",
            json!({"email": "admin@example.com", "password": "wrong-password"}),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/login",
            json!({"email": "nobody@example.com", "password": "password"}),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_register_hashes_a_phc_string_like_any_other_password() {
    let app = app().await;
    let supplied = hash_password("a").unwrap();
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "sneaky@example.com", "password": supplied.clone()}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let stored = app
        .store
        .find_user_by_email("sneaky@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, supplied);

    let login = |password: &str| {
        json_request(
            Method::POST,
            "/api/login",
            json!({"email": "sneaky@example.com", "password": password}),
        )
    };
    let (status, _) = send(&app.router, login("a")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app.router, login(supplied.as_str())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_whitespace_is_significant() {
    let app = app().await;
    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "spaces@example.com", "password": "  abcd  "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let login = |password: &str| {
        json_request(
            Method::POST,
            "/api/login",
            json!({"email": " Spaces@example.com ", "password": password}),
        )
    };
    let (status, _) = send(&app.router, login("  abcd  ")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app.router, login("abcd")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/register",
            json!({"email": "blank@example.com", "password": "      "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

fn contact_body() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.org",
        "businessName": "Doe Books",
        "message": "Please call <me>"
    })
}

#[tokio::test]
async fn test_contact_without_provider_is_503() {
    let app = app().await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/contact", contact_body()),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_contact_validation_precedes_provider_check() {
    let app = app().await;
    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/api/contact", json!({"name": "Jane"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contact_rejects_address_the_transport_would_refuse() {
    let app = app_with(Mail::Recording, false).await;
    let mut body = contact_body();
    body["email"] = json!("jane@x@example.com");
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/contact", body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_contact_sends_escaped_mail_with_reply_to() {
    let app = app_with(Mail::Recording, false).await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/contact", contact_body()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email sent successfully");
    assert_eq!(body["messageId"], "<test-1@example.com>");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to, "jane@example.org");
    assert_eq!(sent[0].from_name, "Jane Doe");
    assert_eq!(sent[0].subject, "New Contact Form Submission from Jane Doe");
    assert!(sent[0].html.contains("Please call &lt;me&gt;"));
    assert!(sent[0].attachments.is_empty());
}

#[tokio::test]
async fn test_contact_accepts_urlencoded_form() {
    let app = app_with(Mail::Recording, false).await;
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "name=Jane+Doe&email=jane%40example.org&howCanWeHelp=Editing",
        ))
        .unwrap();
    let (status, _) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.mailer.sent()[0].html.contains("Editing"));
}

#[tokio::test]
async fn test_provider_failure_is_500_with_details() {
    let app = app_with(Mail::Failing, false).await;
    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/contact", contact_body()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Failed to send email");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("not verified"));
}

fn application_parts<'a>(resume: &'a [u8]) -> Vec<Part<'a>> {
    vec![
        Part::Text("name", "Jane Doe"),
        Part::Text("email", "jane@example.org"),
        Part::Text("phone", "555-0100"),
        Part::Text("jobTitle", "Senior Editor"),
        Part::File {
            field: "resume",
            filename: "jane.pdf",
            content_type: "application/pdf",
            bytes: resume,
        },
    ]
}

#[tokio::test]
async fn test_career_application_attaches_resume() {
    let app = app_with(Mail::Recording, false).await;
    let (status, body) = send(
        &app.router,
        multipart_request("/api/career/apply", &application_parts(b"%PDF-1.4 cv")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["messageId"].is_string());

    let sent = app.mailer.sent();
    assert_eq!(sent[0].subject, "New Job Application: Senior Editor - Jane Doe");
    assert_eq!(sent[0].reply_to, "jane@example.org");
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(sent[0].attachments[0].filename, "jane.pdf");
    assert_eq!(&sent[0].attachments[0].bytes[..], b"%PDF-1.4 cv");
    assert!(!app.tmp.path().join("resumes").exists());
}

#[tokio::test]
async fn test_career_application_rejects_malformed_email() {
    let app = app_with(Mail::Recording, false).await;
    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/career/apply",
            &[
                Part::Text("name", "Jane Doe"),
                Part::Text("email", "jane@x@example.com"),
                Part::File {
                    field: "resume",
                    filename: "jane.pdf",
                    content_type: "application/pdf",
                    bytes: b"%PDF-1.4 cv",
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_career_application_requires_resume() {
    let app = app_with(Mail::Recording, false).await;
    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/career/apply",
            &[
                Part::Text("name", "Jane Doe"),
                Part::Text("email", "jane@example.org"),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_career_application_without_provider_is_503() {
    let app = app().await;
    let (status, _) = send(
        &app.router,
        multipart_request("/api/career/apply", &application_parts(b"%PDF")),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_kept_resumes_are_archived() {
    let app = app_with(Mail::Recording, true).await;
    let (status, _) = send(
        &app.router,
        multipart_request("/api/career/apply", &application_parts(b"%PDF-1.4 cv")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let archived: Vec<_> = std::fs::read_dir(app.tmp.path().join("resumes"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(archived.len(), 1);
    assert_eq!(std::fs::read(&archived[0]).unwrap(), b"%PDF-1.4 cv");
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_production_cors_only_admits_allow_list() {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/site".to_string()),
        "APP_ENV" => Some("production".to_string()),
        "FRONTEND_URL" => Some("https://www.example.com".to_string()),
        _ => None,
    })
    .unwrap();
    let app = app().await;
    let router = app.router.clone().layer(cors_layer(&config));

    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/jobs")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = router
        .clone()
        .oneshot(preflight("https://www.example.com"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://www.example.com"
    );

    let denied = router
        .oneshot(preflight("https://evil.example.net"))
        .await
        .unwrap();
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
