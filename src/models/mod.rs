pub mod dataset;
pub mod interval;

pub use dataset::*;
pub use interval::*;
