//! PdfService – chainable builder that collects page options and content,
//! then asks the rendering backend for the PDF.
//!
//! ```no_run
//! use pdf_relay::{PageFormat, PdfService};
//!
//! let pdf = PdfService::new("https://gotenberg.internal", "secret")?
//!     .format(PageFormat::Letter)?
//!     .landscape()
//!     .header_html("<h1>Quarterly report</h1>")
//!     .footer_html("<p>Page @pageNumber of @totalPages</p>")
//!     .html("<p>Body</p>")
//!     .content()?;
//! # Ok::<(), pdf_relay::PdfError>(())
//! ```
//!
//! Setters consume and return the service, terminal operations consume it.
//! A service describes one document; build a new one (or clone a configured
//! prototype) for every render.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{Credentials, GotenbergBackend, RenderBackend};
use crate::config::Config;
use crate::directives;
use crate::error::{PdfError, Result};
use crate::filename::{self, DEFAULT_FILENAME};
use crate::format::IntoPageFormat;
use crate::inliner::ImageInliner;
use crate::request::{MarginPolicy, Margins, PageOrientation, PageSize, RenderRequest, SizeValue};
use crate::response::{Disposition, PdfResponse};
use crate::storage::Disks;
use crate::templates::{TemplateData, TemplateRenderer};

/// Request builder and entry point for rendering.
#[derive(Clone)]
pub struct PdfService {
    credentials: Credentials,
    backend: Arc<dyn RenderBackend>,
    disks: Arc<Disks>,
    renderer: Option<Arc<dyn TemplateRenderer>>,

    orientation: PageOrientation,
    page_size: PageSize,
    margins: MarginPolicy,
    header_html: Option<String>,
    footer_html: Option<String>,
    body_html: Option<String>,
    wait_delay: String,
    name: Option<String>,
    disk: Option<String>,
}

impl fmt::Debug for PdfService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfService")
            .field("credentials", &self.credentials)
            .field("disks", &self.disks)
            .field("has_renderer", &self.renderer.is_some())
            .field("orientation", &self.orientation)
            .field("page_size", &self.page_size)
            .field("margins", &self.margins)
            .field("has_header", &self.header_html.is_some())
            .field("has_footer", &self.footer_html.is_some())
            .field("has_body", &self.body_html.is_some())
            .field("wait_delay", &self.wait_delay)
            .field("name", &self.name)
            .field("disk", &self.disk)
            .finish()
    }
}

impl PdfService {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Service with explicit credentials and default configuration for
    /// everything else.
    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        let config = Config { url: api_url.to_string(), key: api_key.to_string(), ..Config::default() };
        Self::from_config(&config)
    }

    /// Service whose missing arguments come from [`Config::load`].
    pub fn make(api_url: Option<&str>, api_key: Option<&str>) -> Result<Self> {
        let mut config = Config::load()?;
        if let Some(url) = api_url {
            config.url = url.to_string();
        }
        if let Some(key) = api_key {
            config.key = key.to_string();
        }
        Self::from_config(&config)
    }

    /// Service built entirely from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Credentials::new(config.url.as_str(), config.key.as_str())?;
        let disks = Disks::from_config(config)?;
        let backend = GotenbergBackend::with_timeout(Duration::from_secs(config.timeout_secs))?;

        Ok(Self {
            credentials,
            backend: Arc::new(backend),
            disks: Arc::new(disks),
            renderer: None,
            orientation: PageOrientation::default(),
            page_size: PageSize::default(),
            margins: MarginPolicy::default(),
            header_html: None,
            footer_html: None,
            body_html: None,
            wait_delay: config.wait_delay.clone(),
            name: None,
            disk: None,
        })
    }

    /// Replace the rendering backend.
    pub fn with_backend(mut self, backend: Arc<dyn RenderBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Install the renderer used by [`view`](Self::view) and friends.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replace the disk registry. A previously selected disk that the new
    /// registry lacks is cleared.
    pub fn with_disks(mut self, disks: Disks) -> Self {
        if let Some(name) = &self.disk {
            if !disks.contains(name) {
                self.disk = None;
            }
        }
        self.disks = Arc::new(disks);
        self
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Body from a template.
    pub fn view(mut self, template: &str, data: &TemplateData) -> Result<Self> {
        self.body_html = Some(self.render_view(template, data)?);
        Ok(self)
    }

    /// Body from raw HTML.
    pub fn html(mut self, html: &str) -> Self {
        self.body_html = Some(self.process_html(html));
        self
    }

    /// Running header from a template.
    pub fn header_view(mut self, template: &str, data: &TemplateData) -> Result<Self> {
        self.header_html = Some(self.render_view(template, data)?);
        Ok(self)
    }

    /// Running header from raw HTML.
    pub fn header_html(mut self, html: &str) -> Self {
        self.header_html = Some(self.process_html(html));
        self
    }

    /// Running footer from a template.
    pub fn footer_view(mut self, template: &str, data: &TemplateData) -> Result<Self> {
        self.footer_html = Some(self.render_view(template, data)?);
        Ok(self)
    }

    /// Running footer from raw HTML.
    pub fn footer_html(mut self, html: &str) -> Self {
        self.footer_html = Some(self.process_html(html));
        self
    }

    // -----------------------------------------------------------------------
    // Page setup
    // -----------------------------------------------------------------------

    /// Raw `[width, height]` in inches; replaces any format.
    pub fn size<I, V>(mut self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<SizeValue>,
    {
        self.page_size = PageSize::from_values(values)?;
        Ok(self)
    }

    /// Named format, either [`PageFormat`](crate::PageFormat) or its key.
    pub fn format(mut self, format: impl IntoPageFormat) -> Result<Self> {
        self.page_size = format.into_page_format()?.into();
        Ok(self)
    }

    pub fn portrait(mut self) -> Self {
        self.orientation = PageOrientation::Portrait;
        self
    }

    pub fn landscape(mut self) -> Self {
        self.orientation = PageOrientation::Landscape;
        self
    }

    /// Explicit margins in inches. Disables header/footer auto adjustment.
    pub fn margins(mut self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        let clamp = |side: &str, v: f64| {
            if v >= 0.0 {
                v
            } else {
                log::warn!("Negative {side} margin {v} clamped to 0");
                0.0
            }
        };
        self.margins = MarginPolicy::Explicit(Margins::new(
            clamp("top", top),
            clamp("right", right),
            clamp("bottom", bottom),
            clamp("left", left),
        ));
        self
    }

    /// Delay before printing, in the backend's duration syntax (`"500ms"`,
    /// `"2s"`).
    pub fn wait_delay(mut self, delay: &str) -> Self {
        self.wait_delay = delay.to_string();
        self
    }

    pub fn wait_delay_duration(self, delay: Duration) -> Self {
        let delay = format!("{}ms", delay.as_millis());
        self.wait_delay(&delay)
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Default filename for [`download`](Self::download) and
    /// [`inline`](Self::inline). Sanitized immediately.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(filename::sanitize(name));
        self
    }

    /// Disk used by [`save`](Self::save).
    pub fn disk(mut self, disk: &str) -> Result<Self> {
        if disk.is_empty() || !self.disks.contains(disk) {
            return Err(PdfError::InvalidDisk(disk.to_string()));
        }
        self.disk = Some(disk.to_string());
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn orientation(&self) -> PageOrientation {
        self.orientation
    }

    pub fn margin_policy(&self) -> MarginPolicy {
        self.margins
    }

    pub fn wait_delay_value(&self) -> &str {
        &self.wait_delay
    }

    pub fn output_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn disk_name(&self) -> Option<&str> {
        self.disk.as_deref()
    }

    pub fn body(&self) -> Option<&str> {
        self.body_html.as_deref()
    }

    pub fn header(&self) -> Option<&str> {
        self.header_html.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer_html.as_deref()
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Freeze the current state into the request the backend will receive.
    pub fn render_request(&self) -> Result<RenderRequest> {
        let body_html = match self.body_html.as_deref() {
            Some(html) if !html.is_empty() => html.to_string(),
            _ => return Err(PdfError::InvalidContent),
        };

        let header_html = self.header_html.clone().filter(|h| !h.is_empty());
        let footer_html = self.footer_html.clone().filter(|h| !h.is_empty());
        let margins = self.margins.resolve(header_html.is_some(), footer_html.is_some());

        Ok(RenderRequest {
            page_size: self.page_size,
            orientation: self.orientation,
            margins,
            header_html,
            footer_html,
            body_html,
            wait_delay: self.wait_delay.clone(),
            print_background: true,
        })
    }

    /// Write the PDF to `path` on the selected (or default) disk.
    pub fn save(self, path: &str) -> Result<()> {
        let pdf = self.generate()?;
        let store = self.disks.resolve(self.disk.as_deref())?;
        store.put(path, &pdf)?;
        log::info!(
            "Saved PDF to '{path}' on disk '{}' ({} bytes)",
            self.disk.as_deref().unwrap_or(self.disks.default_name()),
            pdf.len()
        );
        Ok(())
    }

    /// Raw PDF bytes.
    pub fn content(self) -> Result<Vec<u8>> {
        self.generate()
    }

    /// Response that makes the browser download the PDF.
    pub fn download(self, filename: Option<&str>) -> Result<PdfResponse> {
        self.respond(filename, Disposition::Attachment)
    }

    /// Response that displays the PDF in the browser.
    pub fn inline(self, filename: Option<&str>) -> Result<PdfResponse> {
        self.respond(filename, Disposition::Inline)
    }

    fn respond(self, filename: Option<&str>, disposition: Disposition) -> Result<PdfResponse> {
        let filename = filename.or(self.name.as_deref()).unwrap_or(DEFAULT_FILENAME);
        let pdf = self.generate()?;
        Ok(PdfResponse::new(pdf, filename, disposition))
    }

    fn generate(&self) -> Result<Vec<u8>> {
        let request = self.render_request()?;
        log::debug!(
            "Rendering {}x{}in {:?} page, margins {:?}, wait {}",
            request.page_size.width,
            request.page_size.height,
            request.orientation,
            request.margins,
            request.wait_delay
        );

        let pdf = self.backend.render(&self.credentials, &request)?;
        log::info!("Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn render_view(&self, template: &str, data: &TemplateData) -> Result<String> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| PdfError::Template(format!("no renderer installed for view [{template}]")))?;
        let html = renderer.render(template, data).map_err(PdfError::Template)?;
        Ok(self.process_html(&html))
    }

    fn process_html(&self, html: &str) -> String {
        let store = self.disks.default_disk();
        directives::process(html, &ImageInliner::new(store.as_ref()))
    }
}
