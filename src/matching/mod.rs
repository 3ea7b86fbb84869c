pub mod constituency;
pub mod normalizer;
pub mod registry;
pub mod scoring;

pub use constituency::*;
pub use normalizer::*;
pub use registry::*;
pub use scoring::{OverlapScore, OverlapThresholds};
