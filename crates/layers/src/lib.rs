pub mod labels;
pub mod overlay;
pub mod style;

pub use overlay::*;
