//! Resolution of string references (schema or config sources) into documents.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strata_core::{Result, StrataError};
use tracing::debug;

/// Turns a reference into a structured document.
pub trait ResourceResolver {
    fn resolve(&self, reference: &str) -> Result<Value>;
}

/// Reads documents from disk. Relative references are joined to `base_dir`.
/// `.toml` files are parsed as TOML, everything else as JSON.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base_dir: PathBuf,
}

impl FileResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolver rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl Default for FileResolver {
    fn default() -> Self {
        Self::current_dir()
    }
}

impl ResourceResolver for FileResolver {
    fn resolve(&self, reference: &str) -> Result<Value> {
        let path = self.path_for(reference);
        debug!(path = %path.display(), "reading configuration resource");
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| StrataError::resolve(path.display().to_string(), e))?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        if is_toml {
            let table: toml::Table = toml::from_str(&raw)
                .map_err(|e| StrataError::resolve(path.display().to_string(), e))?;
            serde_json::to_value(table)
                .map_err(|e| StrataError::resolve(path.display().to_string(), e))
        } else {
            serde_json::from_str(&raw)
                .map_err(|e| StrataError::resolve(path.display().to_string(), e))
        }
    }
}

/// Named in-memory documents, for tests and embedded defaults.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    documents: HashMap<String, Value>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, document: Value) -> Self {
        self.insert(name, document);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, document: Value) {
        self.documents.insert(name.into(), document);
    }
}

impl ResourceResolver for MemoryResolver {
    fn resolve(&self, reference: &str) -> Result<Value> {
        self.documents
            .get(reference)
            .cloned()
            .ok_or_else(|| StrataError::resolve(reference, "no such document"))
    }
}
