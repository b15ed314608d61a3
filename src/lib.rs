//! # pdf-relay – HTML → PDF through a headless-browser rendering API
//!
//! This crate assembles a PDF conversion request and hands it to an external
//! Chromium-based renderer (a Gotenberg-compatible HTTP API). The stages are:
//!
//! 1. **Configure** – page format or size, orientation, margins, wait delay
//!    ([`service`], [`format`], [`request`])
//! 2. **Preprocess** – expand `@pageNumber`, `@totalPages`, `@pageBreak` and
//!    `@inlinedImage('…')` in every HTML fragment ([`directives`], [`inliner`])
//! 3. **Freeze** – resolve effective margins into an immutable
//!    [`RenderRequest`]
//! 4. **Render** – one multipart POST with an `X-Api-Key` header ([`backend`])
//! 5. **Deliver** – raw bytes, a stored file ([`storage`]) or an HTTP response
//!    ([`response`])

pub mod backend;
pub mod config;
pub mod directives;
pub mod error;
pub mod filename;
pub mod format;
pub mod global;
pub mod inliner;
pub mod request;
pub mod response;
pub mod service;
pub mod storage;
pub mod templates;

// Re-exports for convenience
pub use backend::{Credentials, GotenbergBackend, RenderBackend};
pub use config::Config;
pub use error::{BackendError, PdfError, Result, StorageError};
pub use format::PageFormat;
pub use global::{pdf, using};
pub use inliner::{ImageInliner, InlinedImage};
pub use request::{MarginPolicy, Margins, PageOrientation, PageSize, RenderRequest};
pub use response::{Disposition, PdfResponse};
pub use service::PdfService;
pub use storage::{BlobStore, Disks, FilesystemStore, MemoryStore};
pub use templates::{TemplateData, TemplateRegistry, TemplateRenderer};
