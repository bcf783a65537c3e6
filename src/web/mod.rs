use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

use crate::models::Product;
use crate::product_manager::ProductManager;
use crate::utils::error::AppError;

pub mod handlers;
pub mod views;

pub use handlers::{add_product, dashboard_page, refresh_product, remove_product};

/// Shared state for the dashboard session: the manager plus the in-memory
/// working copy of the product table, re-persisted on every mutation.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ProductManager>,
    pub products: Arc<tokio::sync::Mutex<Vec<Product>>>,
}

impl AppState {
    pub fn new(manager: ProductManager, products: Vec<Product>) -> Self {
        Self {
            manager: Arc::new(manager),
            products: Arc::new(tokio::sync::Mutex::new(products)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(dashboard_page))
        .route("/products", post(add_product))
        .route("/products/update", post(refresh_product))
        .route("/products/remove", post(remove_product))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "vigia"
    }))
}

// Flow failures become flash messages inside the handlers; reaching this
// impl means rendering or storage itself failed.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidUrl(_) | AppError::AlreadyTracked(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::FetchTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
