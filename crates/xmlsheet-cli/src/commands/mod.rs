//! CLI command implementations.

pub mod edit;
pub mod export;
pub mod fields;
pub mod inspect;
pub mod restore;
pub mod serve;
pub mod status;

use std::path::Path;

use xmlsheet::Catalog;

/// Whether a source argument names a URL rather than a local file.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load a catalog from a local `.xml` file or a URL into an opened catalog.
pub fn load_source(catalog: &mut Catalog, source: &str) -> xmlsheet::Result<()> {
    if is_url(source) {
        catalog.load_url(source)?;
    } else {
        catalog.load_file(source)?;
    }
    Ok(())
}

/// Open the overlay store and load the given source.
pub fn open_catalog(store: &Path, source: &str) -> Result<Catalog, Box<dyn std::error::Error>> {
    let mut catalog = Catalog::open(store)?;
    load_source(&mut catalog, source)?;
    Ok(catalog)
}
