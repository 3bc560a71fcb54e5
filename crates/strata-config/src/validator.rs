//! Adapter over the `jsonschema` engine.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use std::fmt;
use std::fmt::Write as _;
use strata_core::{Result, StrataError};

/// One validation failure, with an instance path in dotted form
/// (`server.port`, `hosts[1].name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn into_error(self) -> StrataError {
        StrataError::Validation {
            path: self.path,
            message: self.message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

/// A schema compiled once and reused for every load.
pub struct SchemaValidator {
    raw: Value,
    compiled: jsonschema::Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator").field("raw", &self.raw).finish_non_exhaustive()
    }
}

impl SchemaValidator {
    pub fn compile(schema: &Value) -> Result<Self> {
        let compiled =
            jsonschema::validator_for(schema).map_err(|e| StrataError::Schema(e.to_string()))?;
        Ok(Self {
            raw: schema.clone(),
            compiled,
        })
    }

    /// Fill schema defaults into `instance`, then validate it. Issues are
    /// returned in the engine's order; an empty list means valid.
    pub fn validate(&self, instance: &mut Value) -> Vec<ValidationIssue> {
        apply_defaults(&self.raw, instance);
        let instance = &*instance;
        self.compiled
            .iter_errors(instance)
            .map(|error| {
                let pointer = error.instance_path.to_string();
                let path = pointer_to_path(&pointer, instance);
                match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        let name = property
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| property.to_string());
                        ValidationIssue {
                            path: join_key(path, &name),
                            message: "is a required property".to_string(),
                        }
                    }
                    _ => ValidationIssue {
                        path,
                        message: error.to_string(),
                    },
                }
            })
            .collect()
    }
}

/// Insert `default` values for properties missing from object instances,
/// descending through `properties` and `items`.
pub fn apply_defaults(schema: &Value, instance: &mut Value) {
    match instance {
        Value::Object(map) => {
            let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                return;
            };
            for (name, child_schema) in properties {
                if !map.contains_key(name) {
                    if let Some(default) = child_schema.get("default") {
                        map.insert(name.clone(), default.clone());
                    }
                }
                if let Some(child) = map.get_mut(name) {
                    apply_defaults(child_schema, child);
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items {
                    apply_defaults(item_schema, item);
                }
            }
        }
        _ => {}
    }
}

/// Convert a JSON pointer into dotted form, rendering array positions as
/// `[n]`. The root separator is dropped.
fn pointer_to_path(pointer: &str, instance: &Value) -> String {
    let mut out = String::new();
    let mut cursor = Some(instance);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match cursor {
            Some(Value::Array(items)) => {
                let _ = write!(out, "[{segment}]");
                cursor = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            Some(Value::Object(map)) => {
                cursor = map.get(&segment);
                out = join_key(out, &segment);
            }
            _ => {
                cursor = None;
                out = join_key(out, &segment);
            }
        }
    }
    out
}

fn join_key(mut path: String, key: &str) -> String {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(key);
    path
}
