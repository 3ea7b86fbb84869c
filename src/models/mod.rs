pub mod attribution;
pub mod header;
pub mod legislator;
pub mod stats;

pub use attribution::*;
pub use header::*;
pub use legislator::*;
pub use stats::*;
