use crate::core::data::device_size::DeviceSize;
use crate::core::data::rect::Rect;

/// Snapshot of one frame to render: the plane window and the target size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    pub view: Rect,
    pub size: DeviceSize,
}

impl FrameRequest {
    #[must_use]
    pub fn new(view: Rect, size: DeviceSize) -> Self {
        Self { view, size }
    }
}
