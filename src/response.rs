//! HTTP response wrapper for serving a generated PDF.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::filename;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// How the browser should present the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Save-as dialog.
    Attachment,
    /// Display in the browser.
    Inline,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }

    /// Header value naming the default file.
    fn default_header(self) -> HeaderValue {
        match self {
            Disposition::Attachment => HeaderValue::from_static("attachment; filename=\"document.pdf\""),
            Disposition::Inline => HeaderValue::from_static("inline; filename=\"document.pdf\""),
        }
    }
}

/// A ready-to-send PDF response.
#[derive(Debug, Clone)]
pub struct PdfResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl PdfResponse {
    /// `200 OK` with PDF headers. `filename` is sanitized before it goes
    /// into `Content-Disposition`.
    pub fn new(body: Vec<u8>, filename: &str, disposition: Disposition) -> Self {
        let filename = filename::sanitize(filename);
        // Sanitized names are printable ASCII, so the fallback is never taken.
        let content_disposition =
            HeaderValue::from_str(&format!("{}; filename=\"{filename}\"", disposition.as_str()))
                .unwrap_or_else(|_| disposition.default_header());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE));
        headers.insert(CONTENT_DISPOSITION, content_disposition);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        Self { status: StatusCode::OK, headers, body }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn content_disposition(&self) -> Option<&str> {
        self.headers.get(CONTENT_DISPOSITION).and_then(|v| v.to_str().ok())
    }
}
