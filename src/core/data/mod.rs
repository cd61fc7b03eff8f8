pub mod affine_transform;
pub mod colour;
pub mod complex;
pub mod device_size;
pub mod palette;
pub mod pixel_buffer;
pub mod point;
pub mod rect;
pub mod viewport_state;
