//! Inference engine: record shape detection and record normalization.

mod normalize;
mod shape;

pub use normalize::normalize_records;
pub use shape::{InferenceConfig, InferredRecords, ShapeInferencer};
