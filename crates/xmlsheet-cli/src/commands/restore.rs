//! Restore command - drop every edit from the overlay store.

use std::path::Path;

use colored::Colorize;
use xmlsheet::OverlayStore;

pub fn run(store: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut overlay = OverlayStore::open_file(store)?;
    let dropped = overlay.state().field_count();
    overlay.clear()?;

    println!(
        "{} original data ({} custom fields dropped from {})",
        "Restored".green().bold(),
        dropped,
        store.display()
    );
    Ok(())
}
