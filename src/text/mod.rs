// Text module
// Normalization shared by detection, signal counting and classification

mod normalize;

pub use normalize::{lowercase, normalize};
