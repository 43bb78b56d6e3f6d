use std::path::{Path, PathBuf};

use crate::{ScoringError, ScoringResult};

/// Where the reference image for a request comes from
#[derive(Debug, Clone)]
pub enum ReferenceSource {
    /// Raw raster bytes supplied with the request
    Bytes(Vec<u8>),
    /// A file on disk
    Path(PathBuf),
    /// A key resolved through the scorer's `ReferenceStore`
    Stored(String),
}

/// Lookup of reference images by key, e.g. a cache of generated prompts
pub trait ReferenceStore: Send + Sync {
    fn fetch(&self, key: &str) -> ScoringResult<Vec<u8>>;
}

/// Reference images stored as `<root>/<key>.<extension>`
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    extension: String,
}

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: "png".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Path a key maps to; keys containing path separators are rejected
    pub fn path_for(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == ".." {
            return None;
        }
        Some(self.root.join(format!("{key}.{}", self.extension)))
    }
}

impl ReferenceStore for DirectoryStore {
    fn fetch(&self, key: &str) -> ScoringResult<Vec<u8>> {
        let path = self
            .path_for(key)
            .ok_or_else(|| ScoringError::MissingReference(format!("invalid reference key '{key}'")))?;
        read_reference(&path)
    }
}

/// Read a reference file; any failure to read it means it cannot be located
pub fn read_reference(path: &Path) -> ScoringResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| ScoringError::MissingReference(format!("{}: {e}", path.display())))
}

/// Resolve a source to raw bytes, or `MissingReference` if it cannot be located
pub fn resolve(source: &ReferenceSource, store: Option<&dyn ReferenceStore>) -> ScoringResult<Vec<u8>> {
    match source {
        ReferenceSource::Bytes(bytes) if bytes.is_empty() => {
            Err(ScoringError::MissingReference("empty reference payload".into()))
        }
        ReferenceSource::Bytes(bytes) => Ok(bytes.clone()),
        ReferenceSource::Path(path) => read_reference(path),
        ReferenceSource::Stored(key) => match store {
            Some(store) => store.fetch(key),
            None => Err(ScoringError::MissingReference(format!(
                "no reference store configured for key '{key}'"
            ))),
        },
    }
}
