//! Fuzz target for catalog parsing.
//!
//! Parsing arbitrary text must return a result, never panic. Successful
//! parses must also survive an XML export and re-parse.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xmlsheet::Catalog;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut catalog = Catalog::in_memory();
    if catalog.load_xml(text).is_ok() {
        if let Ok(exported) = catalog.export_xml() {
            let _ = xmlsheet::parse_catalog(&exported);
        }
    }
});
