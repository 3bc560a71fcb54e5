//! # strata-core
//!
//! Shared vocabulary for the strata workspace: the unified error type and the
//! description of a configuration source handed to a loader.

pub mod error;
pub mod source;

pub use error::{Result, StrataError};
pub use source::ConfigSource;
