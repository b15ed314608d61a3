//! Rendering backend – the HTTP service that turns HTML into PDF.
//!
//! [`GotenbergBackend`] speaks the Chromium HTML route of a
//! Gotenberg-compatible API: one multipart POST carrying page options and the
//! HTML documents, answered with PDF bytes.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{BackendError, PdfError};
use crate::request::RenderRequest;

/// Route appended to the API URL.
pub const CONVERT_HTML_ROUTE: &str = "/forms/chromium/convert/html";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Validated backend URL and API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_url: String,
    api_key: String,
}

impl Credentials {
    /// Both values must be non-empty. A trailing `/` on the URL is dropped.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, PdfError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let api_key = api_key.into();
        if api_url.is_empty() || api_key.is_empty() {
            return Err(PdfError::InvalidCredentials);
        }
        Ok(Self { api_url, api_key })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Full URL of the HTML conversion route.
    pub fn convert_url(&self) -> String {
        format!("{}{}", self.api_url, CONVERT_HTML_ROUTE)
    }
}

// Keep the key out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .finish()
    }
}

/// Something that renders a [`RenderRequest`] to PDF bytes.
pub trait RenderBackend: Send + Sync {
    fn render(&self, credentials: &Credentials, request: &RenderRequest) -> Result<Vec<u8>, BackendError>;
}

/// Blocking reqwest client for a Gotenberg-compatible API.
#[derive(Debug, Clone)]
pub struct GotenbergBackend {
    client: Client,
    timeout: Duration,
}

impl GotenbergBackend {
    /// Client with the default timeout.
    pub fn new() -> Result<Self, BackendError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl RenderBackend for GotenbergBackend {
    fn render(&self, credentials: &Credentials, request: &RenderRequest) -> Result<Vec<u8>, BackendError> {
        let url = credentials.convert_url();
        log::debug!("POST {url} ({} document(s))", request.files().len());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credentials.api_key())
            .multipart(request.to_form()?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Status { status: status.as_u16(), message });
        }

        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PageFormat;
    use crate::request::{Margins, PageOrientation};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    #[test]
    fn credentials_require_both_values() {
        assert!(matches!(Credentials::new("", "key"), Err(PdfError::InvalidCredentials)));
        assert!(matches!(
            Credentials::new("https://example.com", ""),
            Err(PdfError::InvalidCredentials)
        ));
        assert!(matches!(Credentials::new("/", "key"), Err(PdfError::InvalidCredentials)));
    }

    #[test]
    fn convert_url_trims_trailing_slash() {
        let credentials = Credentials::new("http://localhost:3000/", "key").unwrap();
        assert_eq!(credentials.api_url(), "http://localhost:3000");
        assert_eq!(credentials.convert_url(), "http://localhost:3000/forms/chromium/convert/html");
    }

    #[test]
    fn debug_hides_key() {
        let credentials = Credentials::new("https://example.com", "super-secret").unwrap();
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("https://example.com"));
    }

    #[test]
    fn backend_builds_with_timeout() {
        let backend = GotenbergBackend::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(backend.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        let backend = GotenbergBackend::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let credentials = Credentials::new("http://127.0.0.1:9", "key").unwrap();
        let request = RenderRequest {
            page_size: PageFormat::A4.into(),
            orientation: PageOrientation::Portrait,
            margins: Margins::default(),
            header_html: None,
            footer_html: None,
            body_html: "<p>x</p>".to_string(),
            wait_delay: "500ms".to_string(),
            print_background: true,
        };
        assert!(matches!(
            backend.render(&credentials, &request),
            Err(BackendError::Transport(_))
        ));
    }

    // -----------------------------------------------------------------
    // Local HTTP server
    // -----------------------------------------------------------------

    /// Serve exactly one request with `response`, handing back the raw
    /// request bytes once the connection is done.
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&raw) {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (url, handle)
    }

    /// Headers received and the body is either `Content-Length` long or a
    /// finished chunked stream.
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let head = text[..split].to_ascii_lowercase();
        let body_len = raw.len() - (split + 4);

        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        match content_length {
            Some(len) => body_len >= len,
            None if head.contains("transfer-encoding: chunked") => text.ends_with("0\r\n\r\n"),
            None => true,
        }
    }

    fn letter_landscape_with_header() -> RenderRequest {
        RenderRequest {
            page_size: PageFormat::Letter.into(),
            orientation: PageOrientation::Landscape,
            margins: Margins::new(1.0, 0.4, 0.4, 0.4),
            header_html: Some("<p>Header</p>".to_string()),
            footer_html: None,
            body_html: "<p>Body</p>".to_string(),
            wait_delay: "1s".to_string(),
            print_background: true,
        }
    }

    #[test]
    fn render_posts_multipart_with_api_key() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 8\r\nConnection: close\r\n\r\n%PDF-1.7",
        );
        let credentials = Credentials::new(url, "sekret").unwrap();
        let backend = GotenbergBackend::with_timeout(Duration::from_secs(5)).unwrap();

        let pdf = backend.render(&credentials, &letter_landscape_with_header()).unwrap();
        assert_eq!(pdf, b"%PDF-1.7");

        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /forms/chromium/convert/html HTTP/1.1\r\n"), "{raw}");
        let lower = raw.to_ascii_lowercase();
        assert!(lower.contains("x-api-key: sekret\r\n"));
        assert!(lower.contains("content-type: multipart/form-data"));
        for field in ["paperWidth", "paperHeight", "marginTop", "waitDelay", "landscape", "printBackground"] {
            assert!(raw.contains(&format!("name=\"{field}\"")), "missing field {field}");
        }
        assert!(raw.contains("filename=\"index.html\""));
        assert!(raw.contains("filename=\"header.html\""));
        assert!(!raw.contains("filename=\"footer.html\""));
        assert!(raw.contains("<p>Header</p>"));
        assert!(raw.contains("<p>Body</p>"));
    }

    #[test]
    fn error_status_becomes_status_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Type: text/plain\r\nContent-Length: 7\r\nConnection: close\r\n\r\nbad key",
        );
        let credentials = Credentials::new(url, "wrong").unwrap();
        let backend = GotenbergBackend::with_timeout(Duration::from_secs(5)).unwrap();

        let err = backend.render(&credentials, &letter_landscape_with_header()).unwrap_err();
        server.join().unwrap();

        match &err {
            BackendError::Status { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert_eq!(err.to_string(), "Rendering backend error (401): bad key");
    }

    #[test]
    #[ignore] // Requires a running Gotenberg at PDF_SERVICE_URL
    fn render_against_live_backend() {
        let url = std::env::var("PDF_SERVICE_URL").unwrap_or_default();
        let key = std::env::var("PDF_SERVICE_KEY").unwrap_or_else(|_| "dev".to_string());
        let credentials = match Credentials::new(url, key) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Live backend test skipped: {e}");
                return;
            }
        };
        let request = RenderRequest {
            page_size: PageFormat::Letter.into(),
            orientation: PageOrientation::Portrait,
            margins: Margins::default(),
            header_html: None,
            footer_html: None,
            body_html: "<h1>Hello</h1>".to_string(),
            wait_delay: "0ms".to_string(),
            print_background: true,
        };
        match GotenbergBackend::new().unwrap().render(&credentials, &request) {
            Ok(bytes) => assert_eq!(&bytes[0..5], b"%PDF-"),
            Err(e) => eprintln!("Live backend test skipped (network error): {e}"),
        }
    }
}
