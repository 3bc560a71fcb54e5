//! # strata-config
//!
//! Schema-driven configuration loading. A JSON Schema describes the expected
//! shape, and its leaves may name an `env` variable or an `arg` flag as a
//! source. Each load merges the given sources into the accumulated state,
//! prunes explicit nulls, overlays environment and argument values (arguments
//! win), fills schema defaults and validates the result.

pub mod args;
pub mod coerce;
pub mod env;
pub mod loader;
pub mod merge;
pub mod overlay;
pub mod resource;
pub mod schema;
pub mod validator;

pub use args::{ArgvFlags, FlagLookup, ProcessArgs};
pub use env::{EnvLookup, ProcessEnv};
pub use loader::{ConfigLoader, LoaderBuilder, SchemaInput};
pub use resource::{FileResolver, MemoryResolver, ResourceResolver};
pub use schema::{ScalarType, SchemaNode, SourceBinding};
pub use strata_core::{ConfigSource, Result, StrataError};
pub use validator::{SchemaValidator, ValidationIssue};
