//! Storage – named blob stores ("disks") used to persist PDFs and to look up
//! images for `@inlinedImage`.
//!
//! Two backends ship with the crate:
//! - [`FilesystemStore`] – keys are paths relative to a root directory
//! - [`MemoryStore`] – process-local map, handy for tests and scratch output

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::{Config, DiskConfig};
use crate::error::{PdfError, StorageError};

/// A key-value blob store.
pub trait BlobStore: Send + Sync {
    /// Whether `key` holds a blob.
    fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Blob contents, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// MIME type of the blob, when the store can tell.
    fn mime_type(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `bytes` at `key`, replacing any previous blob.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Contents and MIME type together, or `None` when absent. Stores that
    /// derive the type from the contents should override this to read once.
    fn get_with_mime(&self, key: &str) -> Result<Option<(Vec<u8>, Option<String>)>, StorageError> {
        match self.get(key)? {
            Some(bytes) => Ok(Some((bytes, self.mime_type(key)?))),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Filesystem-backed store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FilesystemStore {
    root: PathBuf,
}

impl FilesystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` below the root. Absolute keys and `..` are rejected.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let mut resolved = self.root.clone();
        let mut any = false;

        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    any = true;
                }
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidKey(key.to_string())),
            }
        }

        if !any {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(resolved)
    }
}

impl BlobStore for FilesystemStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.path_for(key)?.is_file())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn mime_type(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_with_mime(key)?.and_then(|(_, mime)| mime))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }

    fn get_with_mime(&self, key: &str) -> Result<Option<(Vec<u8>, Option<String>)>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                let mime = sniff_mime(&bytes, &path);
                Ok(Some((bytes, mime)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Content sniffing first, then the file extension.
fn sniff_mime(bytes: &[u8], path: &Path) -> Option<String> {
    if let Ok(format) = image::guess_format(bytes) {
        return Some(format.to_mime_type().to_string());
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "svg" => Some("image/svg+xml".to_string()),
        "pdf" => Some("application/pdf".to_string()),
        _ => image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type().to_string()),
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MemoryBlob {
    bytes: Vec<u8>,
    mime: Option<String>,
}

/// In-process store. Blobs written through [`BlobStore::put`] get their MIME
/// type sniffed from content.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, MemoryBlob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob with an explicit MIME type.
    pub fn insert_with_mime(&self, key: &str, bytes: impl Into<Vec<u8>>, mime: &str) {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(
                key.to_string(),
                MemoryBlob { bytes: bytes.into(), mime: Some(mime.to_string()) },
            );
        }
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match self.blobs.read() {
            Ok(blobs) => blobs.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        keys.sort();
        keys
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl BlobStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
        Ok(blobs.contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
        Ok(blobs.get(key).map(|b| b.bytes.clone()))
    }

    fn mime_type(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
        Ok(blobs.get(key).and_then(|b| b.mime.clone()))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mime = sniff_mime(bytes, Path::new(key));
        let mut blobs = self.blobs.write().map_err(|_| Self::poisoned())?;
        blobs.insert(key.to_string(), MemoryBlob { bytes: bytes.to_vec(), mime });
        Ok(())
    }

    fn get_with_mime(&self, key: &str) -> Result<Option<(Vec<u8>, Option<String>)>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| Self::poisoned())?;
        Ok(blobs.get(key).map(|b| (b.bytes.clone(), b.mime.clone())))
    }
}

// ---------------------------------------------------------------------------
// Disk registry
// ---------------------------------------------------------------------------

/// Named stores plus the name of the default one.
#[derive(Clone)]
pub struct Disks {
    default: String,
    stores: HashMap<String, Arc<dyn BlobStore>>,
}

impl fmt::Debug for Disks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.stores.keys().collect();
        names.sort();
        f.debug_struct("Disks")
            .field("default", &self.default)
            .field("stores", &names)
            .finish()
    }
}

impl Disks {
    /// Registry with a single store, which is also the default.
    pub fn single(name: &str, store: Arc<dyn BlobStore>) -> Self {
        let mut stores = HashMap::new();
        stores.insert(name.to_string(), store);
        Self { default: name.to_string(), stores }
    }

    /// Add or replace a named store.
    pub fn with_disk(mut self, name: &str, store: Arc<dyn BlobStore>) -> Self {
        self.stores.insert(name.to_string(), store);
        self
    }

    /// Build the registry described by `config.disks`.
    ///
    /// Fails with [`PdfError::InvalidDisk`] when `default_disk` names a disk
    /// that is not defined.
    pub fn from_config(config: &Config) -> Result<Self, PdfError> {
        let stores = config
            .disks
            .iter()
            .map(|(name, disk)| {
                let store: Arc<dyn BlobStore> = match disk {
                    DiskConfig::Local { root } => Arc::new(FilesystemStore::new(root.clone())),
                    DiskConfig::Memory => Arc::new(MemoryStore::new()),
                };
                (name.clone(), store)
            })
            .collect::<HashMap<_, _>>();

        if !stores.contains_key(&config.default_disk) {
            return Err(PdfError::InvalidDisk(config.default_disk.clone()));
        }

        Ok(Self { default: config.default_disk.clone(), stores })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BlobStore>> {
        self.stores.get(name)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn default_disk(&self) -> &Arc<dyn BlobStore> {
        // `single` and `from_config` both guarantee the default is present.
        &self.stores[&self.default]
    }

    /// Named disk, or the default when `name` is `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Arc<dyn BlobStore>, PdfError> {
        match name {
            None => Ok(self.default_disk()),
            Some(name) => self
                .get(name)
                .ok_or_else(|| PdfError::InvalidDisk(name.to_string())),
        }
    }
}
