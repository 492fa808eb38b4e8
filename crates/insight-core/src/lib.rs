//! Shared building blocks for the InsightFlow crates: layered application
//! configuration and the top-level error type every library error converts
//! into.

pub mod config;
pub mod error;

pub use self::config::*;
pub use self::error::*;
