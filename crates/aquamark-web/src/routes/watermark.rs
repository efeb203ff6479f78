//! Watermark route - multipart upload, watermarking, and response framing.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::helpers::{ResultExt, RouteResult, engine_error_response, logo_error_response};
use crate::state::AppState;

/// Header carrying the resolved jurisdiction advisory.
const DISCLAIMER_HEADER: &str = "X-State-Disclaimer";

#[derive(Debug, Deserialize)]
pub struct WatermarkParams {
    /// `binary` returns the raw PDF; anything else returns JSON
    format: Option<String>,
}

#[derive(Serialize)]
struct WatermarkResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    disclaimer: Option<String>,
    /// Watermarked PDF, base64-encoded
    file: String,
}

/// Watermark an uploaded PDF with the account's stored logo.
///
/// Multipart fields: `pdf` (the document), `user_email` (selects the logo),
/// and optional `state` (jurisdiction for the advisory).
pub async fn watermark(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WatermarkParams>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> RouteResult<Response> {
    authorize(&state, &headers)?;

    let mut pdf: Option<Bytes> = None;
    let mut user_email: Option<String> = None;
    let mut jurisdiction: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "pdf" => pdf = Some(field.bytes().await.or_bad_request()?),
            "user_email" => user_email = Some(field.text().await.or_bad_request()?),
            "state" => jurisdiction = Some(field.text().await.or_bad_request()?),
            _ => {}
        }
    }

    let pdf = pdf
        .filter(|bytes| !bytes.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "Missing pdf file".to_string()))?;
    let user_email = user_email
        .filter(|email| !email.trim().is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "Missing user_email".to_string()))?;

    let logo = state
        .logo_store()
        .fetch(&user_email)
        .await
        .map_err(|e| logo_error_response(&e))?;

    info!(
        "Watermarking {} byte document for {}",
        pdf.len(),
        user_email
    );

    // Stamping is CPU-bound; keep it off the async runtime
    let task_state = Arc::clone(&state);
    let output = tokio::task::spawn_blocking(move || {
        task_state
            .watermarker()
            .process(&pdf, &logo, jurisdiction.as_deref())
    })
    .await
    .map_err(|e| {
        error!("Watermark task panicked: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Watermarking failed".to_string(),
        )
    })?
    .map_err(|e| engine_error_response(&e))?;

    if params.format.as_deref() == Some("binary") {
        binary_response(output.pdf_bytes, output.disclaimer.as_deref())
    } else {
        json_response(output.pdf_bytes, output.disclaimer)
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> RouteResult<()> {
    let Some(expected) = state.api_token() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            "Invalid or missing bearer token".to_string(),
        ))
    }
}

fn json_response(pdf_bytes: Vec<u8>, disclaimer: Option<String>) -> RouteResult<Response> {
    let header_value = disclaimer
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .or_internal_error()?;

    let mut response = axum::Json(WatermarkResponse {
        success: true,
        disclaimer,
        file: BASE64.encode(pdf_bytes),
    })
    .into_response();

    if let Some(value) = header_value {
        response.headers_mut().insert(DISCLAIMER_HEADER, value);
    }

    Ok(response)
}

fn binary_response(pdf_bytes: Vec<u8>, disclaimer: Option<&str>) -> RouteResult<Response> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"watermarked.pdf\"",
        );

    if let Some(advisory) = disclaimer {
        builder = builder.header(DISCLAIMER_HEADER, advisory);
    }

    builder.body(Body::from(pdf_bytes)).or_internal_error()
}
