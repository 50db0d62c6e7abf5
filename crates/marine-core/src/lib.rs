//! Core types and traits for the marine forecast cache.
//!
//! This crate provides the foundational building blocks including:
//! - The cached forecast model (Snapshot, CacheRecord)
//! - Upstream series types (RawSeries, unit tags, field names)
//! - The canonical hourly grid every field is aligned to
//! - Traits for upstream fetchers and the tide model

pub mod error;
pub mod traits;
pub mod types;

pub use error::{MarineError, MarineResult};
pub use traits::*;
pub use types::*;
