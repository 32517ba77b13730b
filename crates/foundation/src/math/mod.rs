pub mod affine;
pub mod polygon;
pub mod precision;
pub mod vec;

pub use affine::*;
pub use polygon::*;
pub use precision::*;
pub use vec::*;
