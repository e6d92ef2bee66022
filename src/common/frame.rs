use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use uuid::Uuid;

use crate::common::Color;

/// Byte order of the three channels stored in a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ChannelOrder {
    pub fn to_color(self, channels: [u8; 3]) -> Color {
        match self {
            ChannelOrder::Rgb => Color::new(channels[0], channels[1], channels[2]),
            ChannelOrder::Bgr => Color::new(channels[2], channels[1], channels[0]),
        }
    }
}

/// A captured frame. The three-channel buffer is stored as-is in
/// `channel_order`; consumers reorder pixels they read.
#[derive(Clone)]
pub struct Frame {
    source_id: Uuid,
    pixels: Arc<RgbImage>,
    channel_order: ChannelOrder,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(source_id: Uuid, pixels: RgbImage, channel_order: ChannelOrder) -> Self {
        Self {
            source_id,
            pixels: Arc::new(pixels),
            channel_order,
            captured_at: Utc::now(),
            frame_id: Uuid::new_v4(),
        }
    }

    pub fn from_image(source_id: Uuid, image: DynamicImage) -> Self {
        Self::new(source_id, image.to_rgb8(), ChannelOrder::Rgb)
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Color at `(x, y)` in RGB order. Caller keeps coordinates in bounds.
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        self.channel_order.to_color(self.pixels.get_pixel(x, y).0)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("source_id", &self.source_id)
            .field("frame_id", &self.frame_id)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channel_order", &self.channel_order)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
