pub mod gesture;
pub mod picking;
pub mod projection;
pub mod selection;
pub mod source;

pub use source::*;
