pub mod geometry;
pub mod score;

pub use geometry::{slice_angles, SliceSpan};
pub use score::{score_to_color_tier, ColorTier, Score};
