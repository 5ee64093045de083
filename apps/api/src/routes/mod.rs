pub mod health;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::handlers as auth;
use crate::config::Config;
use crate::content::{images, jobs, pages, services};
use crate::errors::AppError;
use crate::media::handlers as media;
use crate::notify::handlers as notify;
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // The handlers enforce the file ceiling themselves; the framework limit
    // only has to let a maximal file through.
    let multipart_limit = DefaultBodyLimit::max(state.max_upload_bytes + MULTIPART_OVERHEAD);

    let mut router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route(
            "/api/jobs/:id",
            put(jobs::update_job).delete(jobs::delete_job),
        )
        .route(
            "/api/images",
            get(images::list_images).post(images::create_image),
        )
        // GET takes a category, PUT and DELETE take an id.
        .route(
            "/api/images/:key",
            get(images::list_images_in)
                .put(images::update_image)
                .delete(images::delete_image),
        )
        .route(
            "/api/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/api/services/:id",
            put(services::update_service).delete(services::delete_service),
        )
        .route(
            "/api/pages/:page_id",
            get(pages::get_page).post(pages::save_page),
        )
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route(
            "/upload",
            post(media::handle_upload).layer(multipart_limit.clone()),
        )
        .route("/api/contact", post(notify::handle_contact))
        .route(
            "/api/career/apply",
            post(notify::handle_career_apply).layer(multipart_limit),
        );

    if let Some(dir) = &state.public_upload_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

/// Development mirrors any origin; production only admits the allow-list.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.production {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{o}'");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    } else {
        AllowOrigin::mirror_request()
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    async fn fine() -> &'static str {
        "still here"
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_json_500() {
        let router = Router::new()
            .route("/boom", get(boom))
            .route("/fine", get(fine))
            .layer(CatchPanicLayer::custom(panic_response));

        let response = router
            .clone()
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("exploded"));

        let response = router
            .oneshot(Request::get("/fine").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
