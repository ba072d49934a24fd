use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// URL to page body store consulted before any network request.
pub trait PageCache {
    fn get(&self, url: &str) -> Option<&str>;
    fn put(&mut self, url: &str, body: String);

    /// Persist pending entries; no-op for caches without backing storage.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    pages: IndexMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageCache for MemoryCache {
    fn get(&self, url: &str) -> Option<&str> {
        self.pages.get(url).map(String::as_str)
    }

    fn put(&mut self, url: &str, body: String) {
        self.pages.insert(url.to_string(), body);
    }
}

/// Cache persisted as one JSON object mapping URL to body.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    pages: MemoryCache,
}

impl JsonFileCache {
    /// Load `path`; a missing or unreadable file starts an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pages = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<IndexMap<String, String>>(&raw) {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "page cache is corrupt; starting empty");
                    IndexMap::new()
                }
            },
            Err(_) => IndexMap::new(),
        };
        debug!(path = %path.display(), entries = pages.len(), "page cache loaded");
        Self {
            path,
            pages: MemoryCache { pages },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string(&self.pages.pages)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), entries = self.pages.len(), "page cache saved");
        Ok(())
    }
}

impl PageCache for JsonFileCache {
    fn get(&self, url: &str) -> Option<&str> {
        self.pages.get(url)
    }

    fn put(&mut self, url: &str, body: String) {
        self.pages.put(url, body);
    }

    fn flush(&self) -> Result<()> {
        self.save()
    }
}
