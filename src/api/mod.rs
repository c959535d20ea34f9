pub mod handlers;

pub use handlers::{export, health_check, reconcile, BANK_FIELD, RECON_FIELD};

use crate::service::ReconService;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(service: Arc<ReconService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/recon", post(reconcile))
        .route("/api/recon/export", post(export))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}
