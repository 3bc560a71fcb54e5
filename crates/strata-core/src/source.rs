use serde_json::Value;
use std::path::{Path, PathBuf};

/// One argument to a loader's `load_from`: an inline document, a reference to
/// an external document, or an ordered list of either.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// A structured value merged as-is.
    Inline(Value),
    /// A name handed to the loader's resource resolver (usually a file path).
    Reference(String),
    /// Sources merged in order, each fully before the next.
    Layers(Vec<ConfigSource>),
}

impl ConfigSource {
    /// Flatten nested layers into the order they are merged.
    pub fn flatten(self) -> Vec<ConfigSource> {
        match self {
            ConfigSource::Layers(layers) => layers.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

/// JSON strings become references and JSON arrays become layers, so a single
/// `serde_json::Value` can describe any source shape.
impl From<Value> for ConfigSource {
    fn from(value: Value) -> Self {
        match value {
            Value::String(reference) => ConfigSource::Reference(reference),
            Value::Array(items) => {
                ConfigSource::Layers(items.into_iter().map(ConfigSource::from).collect())
            }
            other => ConfigSource::Inline(other),
        }
    }
}

impl From<&str> for ConfigSource {
    fn from(reference: &str) -> Self {
        ConfigSource::Reference(reference.to_string())
    }
}

impl From<String> for ConfigSource {
    fn from(reference: String) -> Self {
        ConfigSource::Reference(reference)
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        ConfigSource::Reference(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::from(path.as_path())
    }
}

impl<T: Into<ConfigSource>> From<Vec<T>> for ConfigSource {
    fn from(items: Vec<T>) -> Self {
        ConfigSource::Layers(items.into_iter().map(Into::into).collect())
    }
}
