//! Glossary listing command

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::output::{self, OutputFormat};

pub fn run(catalog: Option<&Path>, format: OutputFormat) -> Result<()> {
    let catalog = super::load_catalog(catalog)?;

    if let Some(rendered) = output::format_structured(&catalog.glossary(), format)? {
        println!("{}", rendered);
        return Ok(());
    }

    for entry in catalog.glossary() {
        println!("{}: {}", entry.term.to_uppercase().cyan().bold(), entry.definition);
    }

    Ok(())
}
