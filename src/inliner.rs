//! Image inliner – turns an `@inlinedImage` argument into `<img>` markup.
//!
//! Absolute `http(s)` URLs are referenced as-is (escaped, never fetched).
//! Anything else is treated as a storage key and embedded as a base64 data
//! URI. Missing or unreadable images degrade to empty markup so a decorative
//! image can never fail a render.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use reqwest::Url;

use crate::storage::BlobStore;

/// MIME type used when the store cannot report one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

const URL_SCHEMES: [&str; 2] = ["http", "https"];

/// Outcome of resolving one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlinedImage {
    /// `<img>` markup ready to splice into HTML.
    Markup(String),
    /// Nothing to emit.
    Empty(EmptyReason),
}

/// Why an image produced no markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    NotFound,
    ReadFailed(String),
}

impl InlinedImage {
    /// Markup, or `""` for an empty outcome.
    pub fn into_markup(self) -> String {
        match self {
            InlinedImage::Markup(markup) => markup,
            InlinedImage::Empty(_) => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, InlinedImage::Empty(_))
    }
}

/// Resolves image references against one blob store.
#[derive(Clone, Copy)]
pub struct ImageInliner<'a> {
    store: &'a dyn BlobStore,
}

impl<'a> ImageInliner<'a> {
    pub fn new(store: &'a dyn BlobStore) -> Self {
        Self { store }
    }

    /// Resolve `path` and return the markup directly.
    pub fn inline_markup(&self, path: &str) -> String {
        self.inline(path).into_markup()
    }

    /// Resolve `path` into an [`InlinedImage`].
    pub fn inline(&self, path: &str) -> InlinedImage {
        if is_absolute_url(path) {
            return InlinedImage::Markup(format!(r#"<img src="{}" />"#, escape_attr(path)));
        }

        match self.lookup(path) {
            Ok(Some(markup)) => InlinedImage::Markup(markup),
            Ok(None) => {
                log::debug!("Inlined image {path:?} not found in storage");
                InlinedImage::Empty(EmptyReason::NotFound)
            }
            Err(reason) => {
                log::warn!("Skipping inlined image {path:?}: {reason}");
                InlinedImage::Empty(EmptyReason::ReadFailed(reason))
            }
        }
    }

    fn lookup(&self, key: &str) -> Result<Option<String>, String> {
        let Some((bytes, mime)) = self.store.get_with_mime(key).map_err(|e| e.to_string())? else {
            return Ok(None);
        };

        let mime = mime
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());

        Ok(Some(data_uri_img(&bytes, &mime)))
    }
}

/// `<img>` tag with a base64 `data:` source.
pub fn data_uri_img(bytes: &[u8], mime: &str) -> String {
    format!(r#"<img src="data:{mime};base64,{}" />"#, BASE64_STD.encode(bytes))
}

/// True for `scheme://...` strings with a supported scheme.
pub fn is_absolute_url(candidate: &str) -> bool {
    if !candidate.contains("://") {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()) && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Escape text for use inside a double- or single-quoted HTML attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    /// Store whose every call fails.
    struct BrokenStore;

    impl BlobStore for BrokenStore {
        fn exists(&self, _key: &str) -> Result<bool, StorageError> {
            Ok(true)
        }
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Unavailable("disk offline".to_string()))
        }
        fn mime_type(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk offline".to_string()))
        }
        fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk offline".to_string()))
        }
    }

    /// Store that panics if touched.
    struct UntouchableStore;

    impl BlobStore for UntouchableStore {
        fn exists(&self, key: &str) -> Result<bool, StorageError> {
            panic!("unexpected lookup of {key}")
        }
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            panic!("unexpected read of {key}")
        }
        fn mime_type(&self, key: &str) -> Result<Option<String>, StorageError> {
            panic!("unexpected mime lookup of {key}")
        }
        fn put(&self, key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
            panic!("unexpected write of {key}")
        }
    }

    /// Store that only answers combined lookups.
    struct SingleReadStore;

    impl BlobStore for SingleReadStore {
        fn exists(&self, key: &str) -> Result<bool, StorageError> {
            panic!("separate existence check for {key}")
        }
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            panic!("separate read of {key}")
        }
        fn mime_type(&self, key: &str) -> Result<Option<String>, StorageError> {
            panic!("separate mime lookup of {key}")
        }
        fn put(&self, key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
            panic!("unexpected write of {key}")
        }
        fn get_with_mime(&self, key: &str) -> Result<Option<(Vec<u8>, Option<String>)>, StorageError> {
            Ok((key == "logo.gif").then(|| (vec![1, 2, 3], Some("image/gif".to_string()))))
        }
    }

    #[test]
    fn stored_images_are_read_in_one_lookup() {
        let inliner = ImageInliner::new(&SingleReadStore);
        assert_eq!(inliner.inline_markup("logo.gif"), r#"<img src="data:image/gif;base64,AQID" />"#);
        assert_eq!(inliner.inline("other.gif"), InlinedImage::Empty(EmptyReason::NotFound));
    }

    #[test]
    fn filesystem_images_inline_with_sniffed_mime() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::storage::FilesystemStore::new(dir.path());
        store.put("brand/logo.dat", &BASE64_STD.decode(PNG_1X1).unwrap()).unwrap();

        let markup = ImageInliner::new(&store).inline_markup("brand/logo.dat");
        assert_eq!(markup, format!(r#"<img src="data:image/png;base64,{PNG_1X1}" />"#));
    }

    #[test]
    fn external_urls_are_not_looked_up() {
        let inliner = ImageInliner::new(&UntouchableStore);
        assert_eq!(
            inliner.inline_markup("https://example.com/image.png"),
            r#"<img src="https://example.com/image.png" />"#
        );
        assert_eq!(
            inliner.inline_markup("http://example.com/image.png"),
            r#"<img src="http://example.com/image.png" />"#
        );
    }

    #[test]
    fn external_urls_are_escaped() {
        let inliner = ImageInliner::new(&UntouchableStore);
        assert_eq!(
            inliner.inline_markup("https://example.com/image.png?foo=bar&baz=qux"),
            r#"<img src="https://example.com/image.png?foo=bar&amp;baz=qux" />"#
        );
        let markup = inliner.inline_markup("https://x.com/i.png?a=\"1\"&b=<2>");
        assert!(markup.contains("&quot;1&quot;&amp;b=&lt;2&gt;"));
    }

    #[test]
    fn missing_key_is_empty() {
        let store = MemoryStore::new();
        let inliner = ImageInliner::new(&store);
        assert_eq!(
            inliner.inline("non-existent/image.png"),
            InlinedImage::Empty(EmptyReason::NotFound)
        );
        assert_eq!(inliner.inline_markup("non-existent/image.png"), "");
    }

    #[test]
    fn stored_png_becomes_data_uri() {
        let store = MemoryStore::new();
        store.put("test-image.png", &BASE64_STD.decode(PNG_1X1).unwrap()).unwrap();

        let markup = ImageInliner::new(&store).inline_markup("test-image.png");
        assert!(markup.starts_with(r#"<img src="data:"#));
        assert!(markup.contains("data:image/png;base64,"));
        assert!(markup.contains(PNG_1X1));
    }

    #[test]
    fn store_mime_type_is_used() {
        let store = MemoryStore::new();
        store.insert_with_mime("brand/logo", b"<svg/>".to_vec(), "image/svg+xml");
        let markup = ImageInliner::new(&store).inline_markup("brand/logo");
        assert_eq!(
            markup,
            format!(r#"<img src="data:image/svg+xml;base64,{}" />"#, BASE64_STD.encode(b"<svg/>"))
        );
    }

    #[test]
    fn unknown_mime_defaults_to_png() {
        let store = MemoryStore::new();
        store.put("blob", b"not really an image").unwrap();
        let markup = ImageInliner::new(&store).inline_markup("blob");
        assert!(markup.contains("data:image/png;base64,"));
    }

    #[test]
    fn read_failures_degrade_to_empty() {
        let outcome = ImageInliner::new(&BrokenStore).inline("logo.png");
        assert!(outcome.is_empty());
        assert!(matches!(outcome, InlinedImage::Empty(EmptyReason::ReadFailed(_))));
        assert_eq!(ImageInliner::new(&BrokenStore).inline_markup("logo.png"), "");
    }

    #[test]
    fn url_detection() {
        assert!(is_absolute_url("https://cdn.example.com/a.png"));
        assert!(!is_absolute_url("images/a.png"));
        assert!(!is_absolute_url("ftp://example.com/a.png"));
        assert!(!is_absolute_url("C:/images/a.png"));
        assert!(!is_absolute_url("https://"));
    }
}
