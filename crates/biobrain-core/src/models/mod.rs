pub mod draft;
pub mod extracted;
pub mod paper;

pub use draft::*;
pub use extracted::*;
pub use paper::*;
