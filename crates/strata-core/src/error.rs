use thiserror::Error;

/// Unified error type for the strata workspace.
#[derive(Error, Debug)]
pub enum StrataError {
    // ── Resource errors ────────────────────────────────────────
    #[error("failed to resolve {reference}: {reason}")]
    Resolve { reference: String, reason: String },

    // ── Coercion errors ────────────────────────────────────────
    #[error("invalid JSON in {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Schema / validation errors ─────────────────────────────
    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("{}", join_path_message(.path, .message))]
    Validation { path: String, message: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StrataError {
    pub fn resolve(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolve {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors raised by schema validation of the merged state.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

fn join_path_message(path: &str, message: &str) -> String {
    if path.is_empty() {
        message.to_string()
    } else {
        format!("{path} {message}")
    }
}

pub type Result<T> = std::result::Result<T, StrataError>;
