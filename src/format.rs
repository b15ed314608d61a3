//! Format catalog – named paper sizes and their physical dimensions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// A standard page format. Dimensions are in inches, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    Letter,
    Legal,
    Tabloid,
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
}

impl PageFormat {
    /// Every format in catalog order.
    pub const ALL: [PageFormat; 10] = [
        PageFormat::Letter,
        PageFormat::Legal,
        PageFormat::Tabloid,
        PageFormat::A0,
        PageFormat::A1,
        PageFormat::A2,
        PageFormat::A3,
        PageFormat::A4,
        PageFormat::A5,
        PageFormat::A6,
    ];

    /// `(width, height)` in inches.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
            PageFormat::Tabloid => (11.0, 17.0),
            PageFormat::A0 => (33.11, 46.81),
            PageFormat::A1 => (23.39, 33.11),
            PageFormat::A2 => (16.54, 23.39),
            PageFormat::A3 => (11.7, 16.54),
            PageFormat::A4 => (8.27, 11.69),
            PageFormat::A5 => (5.83, 8.27),
            PageFormat::A6 => (4.13, 5.83),
        }
    }

    /// Lowercase key accepted by [`FromStr`].
    pub fn key(self) -> &'static str {
        match self {
            PageFormat::Letter => "letter",
            PageFormat::Legal => "legal",
            PageFormat::Tabloid => "tabloid",
            PageFormat::A0 => "a0",
            PageFormat::A1 => "a1",
            PageFormat::A2 => "a2",
            PageFormat::A3 => "a3",
            PageFormat::A4 => "a4",
            PageFormat::A5 => "a5",
            PageFormat::A6 => "a6",
        }
    }
}

impl fmt::Display for PageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Case-sensitive: only the lowercase keys are recognised.
impl FromStr for PageFormat {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageFormat::ALL
            .into_iter()
            .find(|format| format.key() == s)
            .ok_or_else(|| PdfError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<&str> for PageFormat {
    type Error = PdfError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Anything [`PdfService::format`](crate::PdfService::format) accepts: the
/// enum itself or its string key.
pub trait IntoPageFormat {
    fn into_page_format(self) -> Result<PageFormat, PdfError>;
}

impl IntoPageFormat for PageFormat {
    fn into_page_format(self) -> Result<PageFormat, PdfError> {
        Ok(self)
    }
}

impl IntoPageFormat for &str {
    fn into_page_format(self) -> Result<PageFormat, PdfError> {
        self.parse()
    }
}

impl IntoPageFormat for String {
    fn into_page_format(self) -> Result<PageFormat, PdfError> {
        self.parse()
    }
}

impl IntoPageFormat for &String {
    fn into_page_format(self) -> Result<PageFormat, PdfError> {
        self.parse()
    }
}
