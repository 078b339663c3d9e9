//! Merge engine: projects source records through the overlay store.

mod engine;
mod working;

pub use engine::MergeEngine;
pub use working::WorkingRecord;
