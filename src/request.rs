//! Render request – the frozen description of one PDF the backend should
//! produce, plus the page geometry types it is built from.

use reqwest::blocking::multipart::{Form, Part};

use crate::error::PdfError;
use crate::format::PageFormat;

const ARITY_MESSAGE: &str = "Size must contain exactly 2 values [width, height]";
const NUMERIC_MESSAGE: &str = "Size values must be numeric";
const POSITIVE_MESSAGE: &str = "Size values must be positive";

/// Margin applied to a side that carries a header or footer, in inches.
pub const HEADER_FOOTER_MARGIN: f64 = 1.0;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: the backend swaps width and height.
    Landscape,
}

/// Paper size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// Validate a raw `[width, height]` list.
    ///
    /// Arity is checked before content so that a list of the wrong length is
    /// always reported as such.
    pub fn from_values<I, V>(values: I) -> Result<Self, PdfError>
    where
        I: IntoIterator<Item = V>,
        V: Into<SizeValue>,
    {
        let values: Vec<SizeValue> = values.into_iter().map(Into::into).collect();
        let [width, height] = values.as_slice() else {
            return Err(PdfError::InvalidSize(ARITY_MESSAGE.to_string()));
        };

        let (Some(width), Some(height)) = (width.as_f64(), height.as_f64()) else {
            return Err(PdfError::InvalidSize(NUMERIC_MESSAGE.to_string()));
        };

        if width <= 0.0 || height <= 0.0 {
            return Err(PdfError::InvalidSize(POSITIVE_MESSAGE.to_string()));
        }

        Ok(Self { width, height })
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageFormat::default().into()
    }
}

impl From<PageFormat> for PageSize {
    fn from(format: PageFormat) -> Self {
        let (width, height) = format.dimensions();
        Self { width, height }
    }
}

/// One element of a raw size list, as a caller may supply it.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeValue {
    Number(f64),
    Text(String),
    /// Anything else (`null`, arrays, objects...).
    Other,
}

impl SizeValue {
    /// Finite numeric value, if any. Numeric strings count.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            SizeValue::Number(n) => *n,
            SizeValue::Text(s) => s.trim().parse::<f64>().ok()?,
            SizeValue::Other => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for SizeValue {
    fn from(v: f64) -> Self {
        SizeValue::Number(v)
    }
}

impl From<f32> for SizeValue {
    fn from(v: f32) -> Self {
        SizeValue::Number(f64::from(v))
    }
}

impl From<i32> for SizeValue {
    fn from(v: i32) -> Self {
        SizeValue::Number(f64::from(v))
    }
}

impl From<u32> for SizeValue {
    fn from(v: u32) -> Self {
        SizeValue::Number(f64::from(v))
    }
}

impl From<&str> for SizeValue {
    fn from(v: &str) -> Self {
        SizeValue::Text(v.to_string())
    }
}

impl From<String> for SizeValue {
    fn from(v: String) -> Self {
        SizeValue::Text(v)
    }
}

impl From<serde_json::Value> for SizeValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Number(n) => n.as_f64().map_or(SizeValue::Other, SizeValue::Number),
            serde_json::Value::String(s) => SizeValue::Text(s),
            _ => SizeValue::Other,
        }
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(0.4)
    }
}

impl Margins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    pub fn uniform(inches: f64) -> Self {
        Self::new(inches, inches, inches, inches)
    }
}

/// Whether margins were chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MarginPolicy {
    /// Default margins, widened to make room for a header/footer.
    #[default]
    Auto,
    /// Caller-supplied margins, used verbatim.
    Explicit(Margins),
}

impl MarginPolicy {
    /// Margins to send for a document with or without header/footer.
    ///
    /// Only top and bottom are ever adjusted, and only under [`Auto`](Self::Auto).
    pub fn resolve(self, has_header: bool, has_footer: bool) -> Margins {
        match self {
            MarginPolicy::Explicit(margins) => margins,
            MarginPolicy::Auto => {
                let mut margins = Margins::default();
                if has_header {
                    margins.top = HEADER_FOOTER_MARGIN;
                }
                if has_footer {
                    margins.bottom = HEADER_FOOTER_MARGIN;
                }
                margins
            }
        }
    }

    pub fn is_explicit(self) -> bool {
        matches!(self, MarginPolicy::Explicit(_))
    }
}

/// Everything the backend needs for one conversion. Built by
/// [`PdfService`](crate::PdfService) at generation time.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub page_size: PageSize,
    pub orientation: PageOrientation,
    /// Effective margins (auto adjustment already applied).
    pub margins: Margins,
    pub header_html: Option<String>,
    pub footer_html: Option<String>,
    pub body_html: String,
    pub wait_delay: String,
    pub print_background: bool,
}

impl RenderRequest {
    /// Scalar form fields in the order they are sent.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("paperWidth", self.page_size.width.to_string()),
            ("paperHeight", self.page_size.height.to_string()),
            ("marginTop", self.margins.top.to_string()),
            ("marginBottom", self.margins.bottom.to_string()),
            ("marginLeft", self.margins.left.to_string()),
            ("marginRight", self.margins.right.to_string()),
            ("waitDelay", self.wait_delay.clone()),
        ];
        if self.print_background {
            fields.push(("printBackground", "true".to_string()));
        }
        if self.orientation == PageOrientation::Landscape {
            fields.push(("landscape", "true".to_string()));
        }
        fields
    }

    /// HTML documents as `(filename, contents)`; the body is always first.
    pub fn files(&self) -> Vec<(&'static str, &str)> {
        let mut files = vec![("index.html", self.body_html.as_str())];
        if let Some(header) = &self.header_html {
            files.push(("header.html", header.as_str()));
        }
        if let Some(footer) = &self.footer_html {
            files.push(("footer.html", footer.as_str()));
        }
        files
    }

    /// Multipart body for the Chromium HTML conversion route.
    pub fn to_form(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, value) in self.form_fields() {
            form = form.text(name, value);
        }
        for (filename, html) in self.files() {
            let part = Part::text(html.to_string())
                .file_name(filename)
                .mime_str("text/html")?;
            form = form.part("files", part);
        }
        Ok(form)
    }
}
