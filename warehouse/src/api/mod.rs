use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::services::ServeDir;
use tower_http::set_header::response::SetResponseHeaderLayer;

use crate::auth::Auth;
use crate::catalog::CatalogStore;
use crate::error::Error;
use crate::forms::FormEngine;
use crate::schema::SchemaStore;
use crate::storage::{FileStore, PUBLIC_PREFIX};
use crate::ui::UiDescriptors;

pub mod auth_handlers;
pub mod catalog_handlers;
pub mod category_handlers;
pub mod dto;
pub mod extract;
pub mod jwt;
pub mod submission_handlers;
pub mod ui_handlers;

/// Upper bound for multipart submissions carrying images.
const SUBMISSION_BODY_LIMIT: usize = 16 * 1024 * 1024;

// ---------- shared state ----------

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub schema: SchemaStore,
    pub forms: FormEngine,
    pub ui: UiDescriptors,
    pub catalog: CatalogStore,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        files: Arc<dyn FileStore>,
        jwt_secret: String,
        jwt_expiry_hours: u64,
    ) -> Self {
        Self {
            auth: Arc::new(Auth::new(db.clone())),
            schema: SchemaStore::new(db.clone()),
            forms: FormEngine::new(db.clone(), files),
            ui: UiDescriptors::new(db.clone()),
            catalog: CatalogStore::new(db),
            jwt_secret,
            jwt_expiry_hours,
        }
    }
}

// ---------- error type ----------

/// A JSON error response: `{"success": false, "error": "..."}` with an HTTP status.
#[derive(Debug)]
pub struct ApiErr(StatusCode, String);

impl ApiErr {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self(status, msg.into())
    }

    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }
}

impl From<Error> for ApiErr {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Storage(_) | Error::Db(_) | Error::Internal(_) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self(status, e.to_string())
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "success": false, "error": self.1 });
        (self.0, Json(body)).into_response()
    }
}

/// Turns a handler panic into a JSON 500 instead of a dropped connection.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");
    ApiErr::internal("Internal server error").into_response()
}

// ---------- router ----------

/// The full application: the routed API wrapped in trailing-slash
/// normalization, which has to run before routing.
pub type App = NormalizePath<Router>;

pub fn app_router(state: AppState, upload_dir: impl AsRef<Path>) -> App {
    let allowed_origins: Vec<HeaderValue> = std::env::var("WH_CORS_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new() // no origins allowed = same-origin only
    } else {
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    let router = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(api_routes())
        .nest_service(PUBLIC_PREFIX, ServeDir::new(upload_dir.as_ref()))
        .fallback(|| async { ApiErr::not_found("No such route") })
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state);

    NormalizePath::trim_trailing_slash(router)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // schema store
        .route("/create/categories", post(category_handlers::create_category))
        .route("/categories", get(category_handlers::list_categories))
        .route("/categories/{id}", get(category_handlers::get_category))
        .route(
            "/categories/{id}/activate",
            patch(category_handlers::activate_category),
        )
        .route(
            "/categories/{id}/deactivate",
            patch(category_handlers::deactivate_category),
        )
        .route(
            "/create/category-fields",
            post(category_handlers::create_fields),
        )
        .route("/field-options", post(category_handlers::create_options))
        // form engine
        .route(
            "/submissions",
            post(submission_handlers::create_submission)
                .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT)),
        )
        .route("/submissions/{id}", get(submission_handlers::get_submission))
        .route(
            "/categories/{id}/submissions",
            get(submission_handlers::list_submissions),
        )
        // UI descriptors
        .route(
            "/ui/screens",
            get(ui_handlers::list_screens).post(ui_handlers::create_screen),
        )
        .route("/ui/screens/{name}", get(ui_handlers::get_screen))
        .route(
            "/ui/screens/{name}/activate",
            patch(ui_handlers::activate_screen),
        )
        .route(
            "/ui/screens/{name}/deactivate",
            patch(ui_handlers::deactivate_screen),
        )
        .route("/ui/components", post(ui_handlers::create_component))
        .route("/ui/actions", post(ui_handlers::create_action))
        // auth
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/me", get(auth_handlers::me))
        // catalog
        .route(
            "/catalog/{kind}",
            get(catalog_handlers::list_items).post(catalog_handlers::create_item),
        )
        .route("/catalog/{kind}/search", get(catalog_handlers::search_items))
        .route(
            "/catalog/{kind}/{id}",
            put(catalog_handlers::update_item).delete(catalog_handlers::delete_item),
        )
}
