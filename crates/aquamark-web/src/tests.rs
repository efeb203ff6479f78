//! Router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

use aquamark_core::AppConfig;
use async_trait::async_trait;

use crate::logo_store::{LogoError, LogoStore};
use crate::router;
use crate::state::AppState;

const USER: &str = "user@example.com";
const BOUNDARY: &str = "AquamarkTestBoundary";

// =============================================================================
// In-Memory Logo Store
// =============================================================================

struct MemoryLogoStore {
    logos: HashMap<String, Vec<u8>>,
}

impl MemoryLogoStore {
    fn with_logo(user_email: &str, png: Vec<u8>) -> Self {
        Self {
            logos: HashMap::from([(user_email.to_string(), png)]),
        }
    }

    fn empty() -> Self {
        Self {
            logos: HashMap::new(),
        }
    }
}

#[async_trait]
impl LogoStore for MemoryLogoStore {
    async fn fetch(&self, user_email: &str) -> Result<Vec<u8>, LogoError> {
        self.logos
            .get(user_email)
            .cloned()
            .ok_or_else(|| LogoError::NotFound(user_email.to_string()))
    }
}

/// Logo store whose backend is always down.
struct BrokenLogoStore;

#[async_trait]
impl LogoStore for BrokenLogoStore {
    async fn fetch(&self, _user_email: &str) -> Result<Vec<u8>, LogoError> {
        Err(LogoError::Upstream("connection refused".to_string()))
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn fixture_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 8, image::Rgba([20, 40, 60, 200]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

fn fixture_pdf() -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => page_tree_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
    };
    doc.objects
        .insert(page_tree_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => page_tree_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

fn test_state(store: impl LogoStore + 'static, api_token: Option<&str>) -> Arc<AppState> {
    Arc::new(
        AppState::new(
            AppConfig::default(),
            Arc::new(store),
            api_token.map(String::from),
        )
        .unwrap(),
    )
}

/// Build a multipart body with the standard field layout.
fn multipart_body(pdf: Option<&[u8]>, user_email: Option<&str>, state: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(pdf) = pdf {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pdf\"; \
                 filename=\"document.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(pdf);
        body.extend_from_slice(b"\r\n");
    }

    for (name, value) in [("user_email", user_email), ("state", state)] {
        if let Some(value) = value {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn watermark_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

// =============================================================================
// Route Tests
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = router(test_state(MemoryLogoStore::empty(), None));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn watermark_returns_base64_json_with_advisory() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), Some("CA")),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("X-State-Disclaimer")
            .and_then(|v| v.to_str().ok()),
        Some("California compliance: Broker disclosures required.")
    );

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["disclaimer"],
        "California compliance: Broker disclosures required."
    );

    let pdf = BASE64.decode(body["file"].as_str().unwrap()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn watermark_omits_advisory_without_state_field() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("X-State-Disclaimer").is_none());

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.get("disclaimer").is_none());
}

#[tokio::test]
async fn binary_format_returns_pdf_attachment() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request(
        "/watermark?format=binary",
        multipart_body(Some(&fixture_pdf()), Some(USER), Some("ny")),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    assert_eq!(
        response
            .headers()
            .get("X-State-Disclaimer")
            .and_then(|v| v.to_str().ok()),
        Some("New York law requires funder-broker transparency.")
    );
    assert!(body_bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn missing_pdf_field_is_bad_request() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request("/watermark", multipart_body(None, Some(USER), None));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_user_email_is_bad_request() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request("/watermark", multipart_body(Some(&fixture_pdf()), None, None));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let app = router(test_state(MemoryLogoStore::empty(), None));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some("nobody@example.com"), None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreachable_logo_store_is_bad_gateway() {
    let app = router(test_state(BrokenLogoStore, None));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn corrupt_pdf_is_unprocessable() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        None,
    ));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(b"not a pdf"), Some(USER), None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn corrupt_logo_is_unprocessable() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, b"not a png".to_vec()),
        None,
    ));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Auth Tests
// =============================================================================

#[tokio::test]
async fn configured_token_rejects_unauthenticated_requests() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        Some("secret-token"),
    ));

    let request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        Some("secret-token"),
    ));

    let mut request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer wrong-token".parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn matching_token_is_accepted() {
    let app = router(test_state(
        MemoryLogoStore::with_logo(USER, fixture_png()),
        Some("secret-token"),
    ));

    let mut request = watermark_request(
        "/watermark",
        multipart_body(Some(&fixture_pdf()), Some(USER), None),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        "Bearer secret-token".parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
