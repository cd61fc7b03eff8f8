pub mod geometry;
pub mod glsl;
pub mod gpu;
pub mod software;
