use crate::error::ReconError;
use crate::io::ExportFormat;
use crate::models::{MatchRecord, ReconOutcome, RunStats};
use crate::service::ReconService;
use axum::{
    extract::{Json, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const RECON_FIELD: &str = "recon_file";
pub const BANK_FIELD: &str = "bank_file";

const NO_DATA_MESSAGE: &str = "No matching data found.";

/// 响应体
#[derive(Debug, Serialize)]
pub struct ReconResponse {
    pub success: bool,
    pub message: String,
    /// "matched" | "no_data"
    pub outcome: Option<&'static str>,
    pub stats: Option<RunStats>,
    pub rows: Vec<MatchRecord>,
}

impl ReconResponse {
    fn failure(e: &ReconError) -> Self {
        Self {
            success: false,
            message: format!("Error: {}", e),
            outcome: None,
            stats: None,
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<ExportFormat>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 对账接口: 返回 JSON 结果
pub async fn reconcile(
    State(service): State<Arc<ReconService>>,
    multipart: Multipart,
) -> Response {
    match run(service, multipart).await {
        Ok(ReconOutcome::Matched(report)) => {
            let response = ReconResponse {
                success: true,
                message: "Data processed successfully!".to_string(),
                outcome: Some("matched"),
                stats: Some(report.stats),
                rows: report.rows,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(ReconOutcome::NoData(stats)) => {
            let response = ReconResponse {
                success: true,
                message: NO_DATA_MESSAGE.to_string(),
                outcome: Some("no_data"),
                stats: Some(stats),
                rows: Vec::new(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// 导出接口: 返回可下载的 xlsx / csv 文件
pub async fn export(
    State(service): State<Arc<ReconService>>,
    Query(params): Query<ExportParams>,
    multipart: Multipart,
) -> Response {
    let format = params.format.unwrap_or_default();
    let rows = match run(service, multipart).await {
        Ok(ReconOutcome::Matched(report)) => report.rows,
        Ok(ReconOutcome::NoData(stats)) => {
            let response = ReconResponse {
                success: false,
                message: NO_DATA_MESSAGE.to_string(),
                outcome: Some("no_data"),
                stats: Some(stats),
                rows: Vec::new(),
            };
            return (StatusCode::NOT_FOUND, Json(response)).into_response();
        }
        Err(e) => return error_response(e),
    };

    match format.render(&rows) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.mime().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", format.file_name()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// 读取上传文件并在阻塞线程池中执行对账
async fn run(service: Arc<ReconService>, multipart: Multipart) -> Result<ReconOutcome, ReconError> {
    let (recon, bank) = read_uploads(multipart).await?;
    tokio::task::spawn_blocking(move || service.reconcile_files(recon, bank))
        .await
        .map_err(|e| ReconError::Internal(e.to_string()))?
}

async fn read_uploads(mut multipart: Multipart) -> Result<(Vec<u8>, Vec<u8>), ReconError> {
    let mut recon = None;
    let mut bank = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ReconError::Upload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ReconError::Upload(format!("{}: {}", file_name, e)))?;

        tracing::info!("Received upload field {} ({}, {} bytes)", name, file_name, data.len());
        match name.as_str() {
            RECON_FIELD => recon = Some(data.to_vec()),
            BANK_FIELD => bank = Some(data.to_vec()),
            other => tracing::debug!("Ignoring unexpected upload field {}", other),
        }
    }

    let recon = recon.ok_or_else(|| ReconError::Upload(format!("missing field '{}'", RECON_FIELD)))?;
    let bank = bank.ok_or_else(|| ReconError::Upload(format!("missing field '{}'", BANK_FIELD)))?;
    Ok((recon, bank))
}

fn error_response(e: ReconError) -> Response {
    let status = if e.is_bad_input() {
        tracing::warn!("Rejected reconciliation input: {}", e);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Reconciliation failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ReconResponse::failure(&e))).into_response()
}
