use std::time::Duration;

use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::rect::Rect;

#[derive(Debug)]
pub struct FrameData {
    pub generation: u64,
    pub view: Rect,
    pub pixel_buffer: PixelBuffer,
    pub render_duration: Duration,
}
