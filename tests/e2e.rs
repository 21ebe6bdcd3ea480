//! End-to-end tests for snap2text.
//!
//! Scenario tests drive a real [`OcrClient`] against a `wiremock` server, so
//! they exercise the multipart upload, status mapping and JSON parsing
//! exactly as they run against a live backend.
//!
//! The `live_*` tests talk to a real OCR server and are gated behind
//! `E2E_ENABLED` and `SNAP2TEXT_ENDPOINT`:
//!   E2E_ENABLED=1 SNAP2TEXT_ENDPOINT=http://localhost:8000/extract-text \
//!     cargo test --test e2e live_ -- --nocapture

use image::{DynamicImage, Rgba, RgbaImage};
use snap2text::{
    download, AlertLevel, ClientConfig, ExtractError, OcrClient, Phase, SelectedFile,
    UploadWorkflow,
};
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

/// `doc.png`, padded to 500 KB.
fn doc_png() -> SelectedFile {
    let mut bytes = png_bytes(64, 32);
    bytes.resize(500 * 1024, 0);
    SelectedFile::from_bytes("doc.png", Some("image/png"), bytes)
}

fn doc_pdf() -> SelectedFile {
    SelectedFile::from_bytes("doc.pdf", Some("application/pdf"), b"%PDF-1.7".to_vec())
}

fn client_for(endpoint: &str) -> OcrClient {
    let config = ClientConfig::builder()
        .endpoint(endpoint)
        .timeout_secs(5)
        .connect_timeout_secs(2)
        .build()
        .expect("valid config");
    OcrClient::new(&config).expect("client")
}

async fn mock_ocr(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/extract-text"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn endpoint(server: &MockServer) -> String {
    format!("{}/extract-text", server.uri())
}

/// Skip unless a live endpoint is configured.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run live tests");
            return;
        }
        match std::env::var("SNAP2TEXT_ENDPOINT") {
            Ok(url) => url,
            Err(_) => {
                println!("SKIP — set SNAP2TEXT_ENDPOINT to the OCR server URL");
                return;
            }
        }
    }};
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_valid_image_is_selected_with_preview() {
    let mut wf = UploadWorkflow::new();
    assert!(wf.select(doc_png()).await);

    assert_eq!(wf.phase(), Phase::FileSelected);
    let file = wf.file().expect("selected file");
    assert_eq!(file.size(), 500 * 1024);
    let preview = wf.preview().expect("preview shown");
    assert!(preview.data_url.starts_with("data:image/png;base64,"));
    assert_eq!(preview.dimensions, Some((64, 32)));
}

#[tokio::test]
async fn scenario_b_pdf_is_refused() {
    let mut wf = UploadWorkflow::new();
    assert!(!wf.select(doc_pdf()).await);

    assert_eq!(wf.phase(), Phase::Idle);
    assert!(wf.file().is_none());
    assert!(wf.preview().is_none());
    let alert = wf.alert().expect("alert");
    assert_eq!(alert.level, AlertLevel::Error);
    assert!(
        alert.message.starts_with("Please upload a valid image file"),
        "got: {}",
        alert.message
    );
}

#[tokio::test]
async fn scenario_c_text_found() {
    let server =
        mock_ocr(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "Hello World" })))
            .await;
    let client = client_for(&endpoint(&server));

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::ResultReady);

    let view = wf.view();
    let result = view.result.expect("result panel visible");
    assert_eq!(result.text, "Hello World");
    assert_eq!(result.char_count, 11);
    assert_eq!(result.stats().words, 2);
    assert_eq!(result.filename, "doc.png");
    let alert = view.alert.expect("alert");
    assert_eq!(alert.level, AlertLevel::Success);
    assert!(alert.message.contains("11"), "got: {}", alert.message);
}

#[tokio::test]
async fn scenario_d_whitespace_only_text() {
    let server =
        mock_ocr(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "   " })))
            .await;
    let client = client_for(&endpoint(&server));

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::FileSelected);

    assert!(wf.view().result.is_none(), "result panel stays hidden");
    let alert = wf.alert().expect("alert");
    assert!(alert.message.to_lowercase().contains("no text detected"));
    assert_ne!(alert.level, AlertLevel::Error);
}

#[tokio::test]
async fn scenario_e_endpoint_unreachable() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = client_for(&format!("http://127.0.0.1:{port}/extract-text"));

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::FileSelected);

    let alert = wf.alert().expect("alert");
    assert_eq!(alert.level, AlertLevel::Error);
    assert!(alert.message.contains("OCR backend"), "got: {}", alert.message);
    assert!(alert.message.contains("server is running"), "got: {}", alert.message);
}

#[tokio::test]
async fn scenario_f_server_error_detail_is_shown() {
    let server = mock_ocr(
        ResponseTemplate::new(500)
            .set_body_json(serde_json::json!({ "detail": "OCR engine crashed" })),
    )
    .await;
    let client = client_for(&endpoint(&server));

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::FileSelected);
    assert!(wf
        .alert()
        .expect("alert")
        .message
        .contains("OCR engine crashed"));
}

// ── Client edge cases ────────────────────────────────────────────────────────

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn upload_is_single_file_part_with_name_and_type() {
    let server =
        mock_ocr(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "x" })))
            .await;
    let client = client_for(&endpoint(&server));
    let file = doc_png();
    client.extract(&file).await.expect("extract");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert!(contains_bytes(
        body,
        b"Content-Disposition: form-data; name=\"file\"; filename=\"doc.png\""
    ));
    assert!(contains_bytes(body, b"Content-Type: image/png"));
    assert!(contains_bytes(body, &file.bytes()[..64]));
}

#[tokio::test]
async fn server_error_without_detail_uses_status() {
    let server = mock_ocr(ResponseTemplate::new(503).set_body_string("Service Unavailable")).await;
    let client = client_for(&endpoint(&server));

    let err = client.extract(&doc_png()).await.unwrap_err();
    assert_eq!(
        err,
        ExtractError::Server {
            status: 503,
            detail: None
        }
    );
    assert!(err.user_message().contains("503"));
}

#[tokio::test]
async fn malformed_success_body_is_parse_error() {
    let server = mock_ocr(ResponseTemplate::new(200).set_body_string("not json")).await;
    let client = client_for(&endpoint(&server));

    let err = client.extract(&doc_png()).await.unwrap_err();
    assert!(matches!(err, ExtractError::Parse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn missing_text_field_is_empty_result() {
    let server = mock_ocr(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "filename": "doc.png" })),
    )
    .await;
    let client = client_for(&endpoint(&server));

    let result = client.extract(&doc_png()).await.expect("soft fallback");
    assert_eq!(result.text, "");
    assert!(result.is_blank());
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": "late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let config = ClientConfig::builder()
        .endpoint(endpoint(&server))
        .timeout_secs(1)
        .build()
        .unwrap();
    let client = OcrClient::new(&config).unwrap();

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::FileSelected);
    let alert = wf.alert().expect("alert");
    assert!(alert.message.contains("timed out"), "got: {}", alert.message);
}

#[tokio::test]
async fn health_check_reads_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "message": "API is running!" })),
        )
        .mount(&server)
        .await;
    let client = client_for(&endpoint(&server));

    assert_eq!(client.check_health().await.unwrap(), "API is running!");
}

// ── Whole session ────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_extract_download_reset_and_reuse() {
    let text = "Invoice #42\n  Total: 19.99 €\n";
    let server =
        mock_ocr(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": text,
            "filename": "doc.png",
            "char_count": 26
        })))
        .await;
    let client = client_for(&endpoint(&server));
    let dir = tempfile::tempdir().unwrap();

    let mut wf = UploadWorkflow::new();
    wf.select(doc_png()).await;
    assert_eq!(wf.extract(&client).await, Phase::ResultReady);

    let shown = wf.view().result.expect("visible").text.clone();
    let base = wf.file().unwrap().base_name().to_string();
    let saved = download(&shown, &base, dir.path()).await.unwrap();
    assert_eq!(saved.file_name().unwrap(), "doc-ocr.txt");
    assert_eq!(std::fs::read(&saved).unwrap(), shown.as_bytes());
    assert_eq!(wf.last_result().unwrap().server_char_count, Some(26));

    wf.reset();
    assert_eq!(wf.phase(), Phase::Idle);
    assert!(wf.alert().is_none());

    // The same workflow is reusable after reset.
    assert!(!wf.select(doc_pdf()).await);
    assert_eq!(wf.phase(), Phase::Idle);
    assert!(wf.select(doc_png()).await);
    assert_eq!(wf.phase(), Phase::FileSelected);
}

// ── Live server (gated) ──────────────────────────────────────────────────────

#[tokio::test]
async fn live_health_check() {
    let url = e2e_skip_unless_ready!();
    let client = client_for(&url);
    let message = client.check_health().await.expect("server should be up");
    println!("Health: {message}");
}

#[tokio::test]
async fn live_blank_image_yields_no_text_or_result() {
    let url = e2e_skip_unless_ready!();
    let client = client_for(&url);
    let file = SelectedFile::from_bytes("doc.png", Some("image/png"), png_bytes(200, 80));

    let mut wf = UploadWorkflow::new();
    wf.select(file).await;
    let phase = wf.extract(&client).await;
    assert_ne!(phase, Phase::Extracting);
    println!("Phase: {phase}, alert: {:?}", wf.alert());
}
