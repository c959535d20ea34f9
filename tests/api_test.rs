mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use utr_recon_rust::api::{self, BANK_FIELD, RECON_FIELD};
use utr_recon_rust::io::{XLSX_FILE_NAME, XLSX_MIME};

const BOUNDARY: &str = "----recon-test-boundary";

fn app() -> Router {
    api::router(Arc::new(service()), 10 * 1024 * 1024)
}

fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, data) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, file_name, XLSX_MIME
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(uri: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn files(known_bank: &str) -> (Vec<u8>, Vec<u8>) {
    let recon = xlsx_bytes(&[ledger(&[("X123", "2024-01-05", 500.0, known_bank)])]);
    let bank = xlsx_bytes(&[sheet(
        "FinoBank",
        FINO_HEADERS,
        &[("X123", "2024-01-05", 500.0, "FinoBank")],
    )]);
    (recon, bank)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_responds() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn recon_returns_rows_as_json() {
    let (recon, bank) = files("FinoBank");
    let response = app()
        .oneshot(upload(
            "/api/recon",
            &[(RECON_FIELD, "recon.xlsx", recon.as_slice()), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"], "matched");
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["UTR"], "X123");
    assert_eq!(body["rows"][0]["Date"], "05-01-2024");
    assert_eq!(body["rows"][0]["final_status"], "Ok");
    assert_eq!(body["stats"]["internal_records"], 1);
}

#[tokio::test]
async fn recon_without_known_banks_reports_no_data() {
    let (recon, bank) = files("MysteryBank");
    let response = app()
        .oneshot(upload(
            "/api/recon",
            &[(RECON_FIELD, "recon.xlsx", recon.as_slice()), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["outcome"], "no_data");
    assert_eq!(body["message"], "No matching data found.");
    assert!(body["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn export_returns_xlsx_attachment() {
    let (recon, bank) = files("FinoBank");
    let response = app()
        .oneshot(upload(
            "/api/recon/export",
            &[(RECON_FIELD, "recon.xlsx", recon.as_slice()), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_MIME);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"{}\"", XLSX_FILE_NAME).as_str()
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // xlsx 是 zip 包
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn export_csv_on_request() {
    let (recon, bank) = files("FinoBank");
    let response = app()
        .oneshot(upload(
            "/api/recon/export?format=csv",
            &[(RECON_FIELD, "recon.xlsx", recon.as_slice()), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("UTR,Amount,Date,Bank Name,"));
    assert!(text.lines().nth(1).unwrap().ends_with(",Ok"));
}

#[tokio::test]
async fn export_without_data_is_not_found() {
    let (recon, bank) = files("MysteryBank");
    let response = app()
        .oneshot(upload(
            "/api/recon/export",
            &[(RECON_FIELD, "recon.xlsx", recon.as_slice()), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["outcome"], "no_data");
}

#[tokio::test]
async fn missing_bank_file_is_bad_request() {
    let (recon, _) = files("FinoBank");
    let response = app()
        .oneshot(upload("/api/recon", &[(RECON_FIELD, "recon.xlsx", recon.as_slice())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains(BANK_FIELD));
}

#[tokio::test]
async fn non_workbook_upload_is_bad_request() {
    let (_, bank) = files("FinoBank");
    let response = app()
        .oneshot(upload(
            "/api/recon",
            &[(RECON_FIELD, "recon.txt", &b"plain text"[..]), (BANK_FIELD, "bank.xlsx", bank.as_slice())],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
