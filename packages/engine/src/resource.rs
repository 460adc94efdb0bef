//! Resources referenced by placeholders
//!
//! A [`ResourceProvider`] turns a handle written in a placeholder into
//! bytes plus a stable identifier. [`ImageDimensions`] memoizes decoded
//! pixel sizes per identifier in a [`SelfClearingCache`].

use crate::error::{EngineError, EngineResult};
use docweave_common::SelfClearingCache;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Stable identifier, usable as a cache key
    pub id: String,
    pub bytes: Vec<u8>,
}

pub trait ResourceProvider: Send + Sync {
    /// Stable identifier of the resource behind `handle`
    fn identify(&self, handle: &str) -> EngineResult<String>;

    fn fetch(&self, handle: &str) -> EngineResult<Resource>;

    /// Resource content as text
    fn fetch_text(&self, handle: &str) -> EngineResult<String> {
        let resource = self.fetch(handle)?;
        String::from_utf8(resource.bytes).map_err(|e| {
            EngineError::io(
                handle,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }
}

/// Provider that has no resources at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceProvider for NoResources {
    fn identify(&self, handle: &str) -> EngineResult<String> {
        Err(not_found(handle))
    }

    fn fetch(&self, handle: &str) -> EngineResult<Resource> {
        Err(not_found(handle))
    }
}

/// Resources stored under a base directory
#[derive(Debug, Clone)]
pub struct FsResourceProvider {
    base: PathBuf,
}

impl FsResourceProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn path_of(&self, handle: &str) -> PathBuf {
        let handle = Path::new(handle);
        if handle.is_absolute() {
            handle.to_path_buf()
        } else {
            self.base.join(handle)
        }
    }
}

impl ResourceProvider for FsResourceProvider {
    fn identify(&self, handle: &str) -> EngineResult<String> {
        let path = self.path_of(handle);
        let canonical = path
            .canonicalize()
            .map_err(|e| EngineError::io(handle, e))?;
        Ok(canonical.to_string_lossy().into_owned())
    }

    fn fetch(&self, handle: &str) -> EngineResult<Resource> {
        let id = self.identify(handle)?;
        let bytes = std::fs::read(&id).map_err(|e| EngineError::io(handle, e))?;
        debug!(resource = %id, bytes = bytes.len(), "read resource");
        Ok(Resource { id, bytes })
    }
}

/// In-memory resources keyed by handle
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceProvider {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handle: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(handle.into(), bytes.into());
        self
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn identify(&self, handle: &str) -> EngineResult<String> {
        if self.entries.contains_key(handle) {
            Ok(format!("memory:{}", handle))
        } else {
            Err(not_found(handle))
        }
    }

    fn fetch(&self, handle: &str) -> EngineResult<Resource> {
        let bytes = self.entries.get(handle).ok_or_else(|| not_found(handle))?;
        Ok(Resource {
            id: format!("memory:{}", handle),
            bytes: bytes.clone(),
        })
    }
}

fn not_found(handle: &str) -> EngineError {
    EngineError::io(
        handle,
        std::io::Error::new(std::io::ErrorKind::NotFound, "resource not found"),
    )
}

/// Cached pixel dimensions of image resources
#[derive(Debug, Clone)]
pub struct ImageDimensions {
    cache: SelfClearingCache<String, (u32, u32)>,
}

impl ImageDimensions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: SelfClearingCache::new(ttl),
        }
    }

    /// `(width, height)` of the image behind `handle`.
    pub fn lookup(&self, provider: &dyn ResourceProvider, handle: &str) -> EngineResult<(u32, u32)> {
        let id = provider.identify(handle)?;
        self.cache.get_or_try_cache(id, || {
            let resource = provider.fetch(handle)?;
            decode_dimensions(handle, &resource.bytes)
        })
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn decode_dimensions(handle: &str, bytes: &[u8]) -> EngineResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EngineError::io(handle, e))?;
    reader.into_dimensions().map_err(|e| {
        EngineError::io(
            handle,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}
