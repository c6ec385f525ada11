pub mod overlay;
pub mod score;
pub mod weights;
