mod geometry;
pub use geometry::*;
mod recognize;
pub use recognize::*;
mod block;
pub use block::*;
mod stitch;
pub use stitch::*;

pub mod tesseract;
