pub mod stage0_scan;
pub mod stage1_resolve;
pub mod stage2_track;
pub mod stage3_segment;
pub mod stage4_stats;

pub use stage0_scan::*;
pub use stage1_resolve::*;
pub use stage2_track::*;
pub use stage3_segment::*;
pub use stage4_stats::*;
