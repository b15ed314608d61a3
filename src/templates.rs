//! Template rendering seam plus sample templates.
//!
//! The crate does not ship a template language. A [`TemplateRenderer`] is any
//! function from a template id and a JSON data map to HTML; closures work
//! directly, and [`TemplateRegistry`] dispatches ids to per-template closures.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Data passed to a template.
pub type TemplateData = Map<String, Value>;

/// Produces HTML for a template id.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, String>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &TemplateData) -> Result<String, String> + Send + Sync,
{
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, String> {
        self(template, data)
    }
}

type TemplateFn = Arc<dyn Fn(&TemplateData) -> String + Send + Sync>;

/// Named templates, each a function of its data.
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, TemplateFn>,
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.templates.keys().collect();
        ids.sort();
        f.debug_struct("TemplateRegistry").field("templates", &ids).finish()
    }
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, id: &str, template: F) -> Self
    where
        F: Fn(&TemplateData) -> String + Send + Sync + 'static,
    {
        self.templates.insert(id.to_string(), Arc::new(template));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Registry holding the sample templates below.
    pub fn samples() -> Self {
        Self::new()
            .register("invoice", invoice_template)
            .register("report.header", report_header)
            .register("report.footer", |_| report_footer().to_string())
    }
}

impl TemplateRenderer for TemplateRegistry {
    fn render(&self, template: &str, data: &TemplateData) -> Result<String, String> {
        self.templates
            .get(template)
            .map(|render| render(data))
            .ok_or_else(|| format!("View [{template}] not found"))
    }
}

fn text<'a>(data: &'a TemplateData, key: &str, fallback: &'a str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or(fallback)
}

/// Invoice body. Reads `number`, `customer` and `total`; pulls the logo from
/// storage key `logo.png`.
pub fn invoice_template(data: &TemplateData) -> String {
    format!(
        r##"
<div class="invoice">
    @inlinedImage('logo.png')
    <h1 style="color: #1a365d">Invoice #{number}</h1>

    <p><strong>Bill to:</strong> {customer}</p>

    <table style="width: 100%">
        <tr><th>Item</th><th>Qty</th><th>Price</th></tr>
        <tr><td>Web Development</td><td>40</td><td>$150.00</td></tr>
        <tr><td>Design Services</td><td>20</td><td>$125.00</td></tr>
    </table>

    @pageBreak

    <h2>Terms</h2>
    <p>Payment due within 30 days. Total: <strong>{total}</strong></p>
</div>
"##,
        number = text(data, "number", "0000"),
        customer = text(data, "customer", "Customer"),
        total = text(data, "total", "$0.00"),
    )
}

/// Running header with the document title (`title`).
pub fn report_header(data: &TemplateData) -> String {
    format!(
        r#"<header style="font-size: 9px; width: 100%; text-align: center">{}</header>"#,
        text(data, "title", "Report")
    )
}

/// Running footer with page numbers.
pub fn report_footer() -> &'static str {
    r#"<footer style="font-size: 9px; width: 100%; text-align: right">Page @pageNumber of @totalPages</footer>"#
}
