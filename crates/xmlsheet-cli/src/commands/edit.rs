//! Edit commands - set, unset, group and drop-column.

use std::path::Path;

use colored::Colorize;
use xmlsheet::Catalog;
use xmlsheet::schema::is_slot_key;

use super::open_catalog;

/// Set a custom field on one record.
pub fn set(
    store: &Path,
    source: &str,
    id: &str,
    name: &str,
    value: &str,
    label: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = open_catalog(store, source)?;
    let name = name.trim();

    let label = match label {
        Some(label) => label.to_string(),
        None if is_slot_key(name) => catalog
            .labels()
            .label(name)
            .map(str::to_string)
            .ok_or_else(|| format!("Record shape has no field '{}'", name))?,
        None => name.to_string(),
    };

    catalog.add_custom_field(id, name, &label, value)?;

    println!(
        "{} {} on record {} = {}",
        "Set".green().bold(),
        name.white(),
        id.white().bold(),
        value
    );
    Ok(())
}

/// Remove a custom field from one record.
pub fn unset(
    store: &Path,
    source: &str,
    id: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = open_catalog(store, source)?;

    if catalog.remove_custom_field(id, name)? {
        println!(
            "{} {} from record {}",
            "Removed".green().bold(),
            name.white(),
            id.white().bold()
        );
    } else {
        println!(
            "{} record {} has no field {}",
            "Note:".yellow(),
            id.white().bold(),
            name.white()
        );
    }
    Ok(())
}

/// Tag records with a new group column.
pub fn group(
    store: &Path,
    source: &str,
    label: &str,
    ids: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = open_catalog(store, source)?;
    let (column, written) = catalog.create_group(label, ids)?;

    println!(
        "{} group {} ({}) on {} records",
        "Created".green().bold(),
        column.label.white().bold(),
        column.name.dimmed(),
        written
    );
    Ok(())
}

/// Delete a custom column from every record in the store.
pub fn drop_column(store: &Path, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = Catalog::open(store)?;
    let removed = catalog.delete_column(name)?;

    println!(
        "{} column {} from {} records",
        "Deleted".green().bold(),
        name.white(),
        removed
    );
    Ok(())
}
