//! Process-wide entry points.
//!
//! [`shared`] lazily builds one [`PdfService`] from [`Config::load`] and keeps
//! it as a read-only prototype. [`pdf`] hands out a clone of it, so every
//! caller configures its own copy and no builder state is shared between
//! concurrent requests. [`using`] skips the prototype entirely.

use std::sync::OnceLock;

use crate::config::Config;
use crate::error::Result;
use crate::service::PdfService;

static SHARED: OnceLock<PdfService> = OnceLock::new();

/// The configured prototype. Initialisation errors are returned to the caller
/// and retried on the next call.
pub fn shared() -> Result<&'static PdfService> {
    prototype_in(&SHARED, Config::load)
}

/// A fresh service cloned from the shared prototype.
pub fn pdf() -> Result<PdfService> {
    shared().cloned()
}

/// Prototype held by `cell`, built from `load` on first use. `load` is not
/// called once the cell is filled.
fn prototype_in<F>(cell: &OnceLock<PdfService>, load: F) -> Result<&PdfService>
where
    F: FnOnce() -> Result<Config>,
{
    if let Some(service) = cell.get() {
        return Ok(service);
    }
    let service = PdfService::from_config(&load()?)?;
    Ok(cell.get_or_init(|| service))
}

/// A service with its own credentials, bypassing the shared prototype.
/// Disks and defaults still come from configuration.
pub fn using(api_url: &str, api_key: &str) -> Result<PdfService> {
    PdfService::make(Some(api_url), Some(api_key))
}
