pub mod range;
pub mod series;
pub mod stats;

pub use range::*;
pub use series::*;
pub use stats::*;
