//! CLI command implementations

pub mod ask;
pub mod classify;
pub mod glossary;
pub mod health;
pub mod periods;

use anyhow::{Context, Result};
use insight_nlp::Catalog;
use std::path::Path;

/// The catalog override if given, else the built-in tables.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::from_yaml_file(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}
