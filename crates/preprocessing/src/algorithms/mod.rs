pub mod augmentation;
pub mod contour;

pub use augmentation::*;
pub use contour::*;
