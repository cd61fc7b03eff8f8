pub mod exponential;
pub mod magnitude_tint;
pub mod palette_gradient;
