//! Fields command - list the stored custom fields of a record.

use std::path::Path;

use colored::Colorize;

use super::open_catalog;

pub fn run(store: &Path, source: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog(store, source)?;

    let record = catalog
        .record(id)
        .ok_or_else(|| format!("Unknown record id: {}", id))?;
    let fields = catalog.store().get_fields(id);

    println!("{} {}", "Record".cyan().bold(), record.id().white().bold());

    if fields.is_empty() {
        println!("  No custom fields.");
        return Ok(());
    }

    for field in fields {
        let kind = if field.is_slot_override() {
            "override".yellow()
        } else {
            "custom".blue()
        };
        println!(
            "  {:<12} {:<16} {} [{}]",
            field.name,
            field.label.dimmed(),
            field.value.white(),
            kind
        );
    }

    Ok(())
}
