//! Fuzz target for overlay store documents.
//!
//! Arbitrary JSON must either fail to deserialize or merge cleanly.

#![no_main]

use libfuzzer_sys::fuzz_target;
use xmlsheet::MergeEngine;
use xmlsheet::overlay::OverlayState;

const SAMPLE: &str = "<CATALOG>\
    <ANIMAL><NAME>Lion</NAME><HABITAT>Savanna</HABITAT></ANIMAL>\
    <ANIMAL><NAME>Owl</NAME></ANIMAL>\
    </CATALOG>";

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(state) = serde_json::from_slice::<OverlayState>(data) {
        if let Ok(parsed) = xmlsheet::parse_catalog(SAMPLE) {
            let _ = MergeEngine::new().merge(&state, &parsed.records);
        }
    }
});
