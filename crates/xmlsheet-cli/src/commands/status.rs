//! Status command - show overlay store and catalog summary.

use std::path::Path;

use colored::Colorize;
use xmlsheet::Catalog;

use super::load_source;

pub fn run(
    store: &Path,
    source: Option<&str>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = Catalog::open(store)?;
    if let Some(source) = source {
        load_source(&mut catalog, source)?;
    }
    let status = catalog.status();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Overlay store:".cyan().bold(),
        status.store_location.white()
    );
    println!("  Version:   {}", status.overlay_version);
    println!(
        "  Last sync: {}",
        status.last_sync.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Custom fields: {} on {} records",
        status.custom_field_count.to_string().white().bold(),
        status.records_with_custom_fields
    );

    if let Some(metadata) = &status.source {
        println!();
        println!(
            "{} {}",
            "Catalog:".cyan().bold(),
            metadata.display_name().white()
        );
        println!("  Size: {} bytes", metadata.size_bytes);
        println!("  Hash: {}", metadata.hash.dimmed());
        if let Some(tag) = &status.record_tag {
            println!("  Record element: {}", tag.white().bold());
        }
        println!("  Records: {}", status.record_count);
        println!("  Fields: {}", status.field_names.join(", "));
        if !status.dropped_fields.is_empty() {
            println!(
                "  {} {}",
                "Dropped:".yellow(),
                status.dropped_fields.join(", ")
            );
        }
    }

    Ok(())
}
