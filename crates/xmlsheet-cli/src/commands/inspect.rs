//! Inspect command - show the inferred shape and the merged records.

use std::path::Path;

use colored::Colorize;

use super::open_catalog;

pub fn run(
    store: &Path,
    source: &str,
    limit: usize,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = open_catalog(store, source)?;
    let records = catalog.merge_with_source_data();
    let labels = catalog.labels();

    if json_output {
        let output = serde_json::json!({
            "schema": catalog.parsed().map(|p| &p.schema),
            "labels": labels,
            "records": records.iter().take(limit).collect::<Vec<_>>(),
            "total_records": records.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let Some(parsed) = catalog.parsed() else {
        return Ok(());
    };

    println!("{} {}", "Catalog:".cyan().bold(), source.white());
    println!(
        "  Record element: {}",
        parsed.schema.record_tag.white().bold()
    );
    println!("  Records: {}", records.len().to_string().white().bold());
    println!("  Fields: {}", parsed.schema.slot_count());
    if !parsed.schema.dropped_fields.is_empty() {
        println!(
            "  {} {}",
            "Dropped (over slot limit):".yellow(),
            parsed.schema.dropped_fields.join(", ")
        );
    }
    println!();

    println!("{}", "Columns:".yellow().bold());
    for (key, label) in labels.iter() {
        println!("  {:<8} {}", key.dimmed(), label);
    }
    for column in catalog.view().custom_columns() {
        println!("  {:<8} {} {}", column.name.dimmed(), column.label, "(custom)".blue());
    }
    println!();

    println!("{}", "Records:".yellow().bold());
    for record in records.iter().take(limit) {
        let values: Vec<String> = labels
            .keys()
            .skip(1)
            .map(|key| record.get(key).unwrap_or("").to_string())
            .collect();
        print!("  {:>4}  {}", record.id().white().bold(), values.join(" | "));

        for field in &record.custom_fields {
            print!("  {}={}", field.name.blue(), field.value);
        }
        println!();

        if verbose {
            let overrides: Vec<&str> = catalog
                .store()
                .get_fields(record.id())
                .iter()
                .filter(|f| f.is_slot_override())
                .map(|f| f.name.as_str())
                .collect();
            if !overrides.is_empty() {
                println!("        {} {}", "edited:".dimmed(), overrides.join(", "));
            }
        }
    }

    if records.len() > limit {
        println!(
            "  {} more records (use --limit to show more)",
            (records.len() - limit).to_string().dimmed()
        );
    }

    Ok(())
}
