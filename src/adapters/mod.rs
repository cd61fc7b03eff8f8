pub mod backend;
pub mod pixel_format;
