use std::collections::HashMap;

use tracing::warn;

use crate::common::{Color, Frame};
use crate::error::ExtractionError;

pub const DEFAULT_REGION_SIZE: u32 = 100;

/// Rectangle in frame coordinates, `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Square of `side` centered on the frame, clamped to its bounds.
    pub fn centered(frame_width: u32, frame_height: u32, side: u32) -> Option<Region> {
        let (x1, x2) = clamp_axis(frame_width, side);
        let (y1, y2) = clamp_axis(frame_height, side);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Region {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

// Spans exactly `side` pixels whenever the extent allows it, odd sides included.
fn clamp_axis(extent: u32, side: u32) -> (u32, u32) {
    let start = (extent / 2).saturating_sub(side / 2);
    (start, start.saturating_add(side).min(extent))
}

/// Finds the most frequent color in the central sample region of a frame.
///
/// Ties between equally frequent colors resolve to the lexicographically
/// smallest `(r, g, b)`.
#[derive(Debug, Clone)]
pub struct ColorExtractor {
    region_size: u32,
}

impl Default for ColorExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_SIZE)
    }
}

impl ColorExtractor {
    pub fn new(region_size: u32) -> Self {
        Self { region_size }
    }

    pub fn region_for(&self, frame: &Frame) -> Option<Region> {
        Region::centered(frame.width(), frame.height(), self.region_size)
    }

    /// Never fails: an unusable frame yields [`Color::BLACK`].
    pub fn dominant_color(&self, frame: &Frame) -> Color {
        match self.try_dominant_color(frame) {
            Ok(color) => color,
            Err(e) => {
                warn!(frame_id = %frame.frame_id(), "Color extraction failed: {}", e);
                Color::BLACK
            }
        }
    }

    pub fn try_dominant_color(&self, frame: &Frame) -> Result<Color, ExtractionError> {
        let empty = || ExtractionError::EmptyRegion {
            width: frame.width(),
            height: frame.height(),
        };
        let region = self.region_for(frame).ok_or_else(empty)?;

        let mut counts: HashMap<Color, u32> = HashMap::with_capacity(region.area().min(4096));
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                *counts.entry(frame.color_at(x, y)).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .max_by(|(color_a, count_a), (color_b, count_b)| {
                count_a.cmp(count_b).then_with(|| color_b.cmp(color_a))
            })
            .map(|(color, _)| color)
            .ok_or_else(empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ChannelOrder;
    use image::{ImageBuffer, Rgb, RgbImage};
    use uuid::Uuid;

    fn uniform(width: u32, height: u32, px: [u8; 3]) -> RgbImage {
        ImageBuffer::from_pixel(width, height, Rgb(px))
    }

    fn frame(img: RgbImage) -> Frame {
        Frame::new(Uuid::new_v4(), img, ChannelOrder::Rgb)
    }

    #[test]
    fn region_is_centered_and_capped() {
        let region = Region::centered(640, 480, 100).unwrap();
        assert_eq!(
            region,
            Region {
                x: 270,
                y: 190,
                width: 100,
                height: 100
            }
        );
    }

    #[test]
    fn region_degenerates_to_full_extent_on_small_frames() {
        let region = Region::centered(40, 300, 100).unwrap();
        assert_eq!(region.x, 0);
        assert_eq!(region.width, 40);
        assert_eq!(region.height, 100);
    }

    #[test]
    fn odd_sides_keep_their_full_width() {
        let region = Region::centered(640, 480, 101).unwrap();
        assert_eq!((region.width, region.height), (101, 101));
        assert_eq!((region.x, region.y), (270, 190));

        let single = Region::centered(50, 50, 1).unwrap();
        assert_eq!(
            single,
            Region {
                x: 25,
                y: 25,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn single_pixel_region_samples_the_center() {
        let mut img = uniform(9, 9, [9, 9, 9]);
        img.put_pixel(4, 4, Rgb([77, 1, 2]));
        assert_eq!(
            ColorExtractor::new(1).dominant_color(&frame(img)),
            Color::new(77, 1, 2)
        );
        let f = frame(uniform(9, 9, [9, 9, 9]));
        assert_eq!(ColorExtractor::new(3).dominant_color(&f), Color::new(9, 9, 9));
    }

    #[test]
    fn uniform_frame_returns_its_color() {
        let extractor = ColorExtractor::default();
        let f = frame(uniform(320, 240, [200, 16, 64]));
        assert_eq!(extractor.dominant_color(&f), Color::new(200, 16, 64));
    }

    #[test]
    fn only_the_center_region_is_sampled() {
        let mut img = uniform(300, 300, [0, 0, 255]);
        for y in 100..200 {
            for x in 100..200 {
                img.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }
        let extractor = ColorExtractor::default();
        assert_eq!(extractor.dominant_color(&frame(img)), Color::new(255, 0, 0));
    }

    #[test]
    fn bgr_frames_are_reordered() {
        let f = Frame::new(Uuid::new_v4(), uniform(120, 120, [0, 0, 255]), ChannelOrder::Bgr);
        assert_eq!(ColorExtractor::default().dominant_color(&f), Color::new(255, 0, 0));
    }

    #[test]
    fn most_frequent_color_wins() {
        let mut img = uniform(100, 100, [10, 10, 10]);
        for x in 0..100 {
            for y in 0..40 {
                img.put_pixel(x, y, Rgb([250, 250, 250]));
            }
        }
        assert_eq!(
            ColorExtractor::default().dominant_color(&frame(img)),
            Color::new(10, 10, 10)
        );
    }

    #[test]
    fn ties_resolve_to_smallest_color() {
        let mut img = uniform(2, 1, [9, 0, 0]);
        img.put_pixel(1, 0, Rgb([1, 200, 200]));
        assert_eq!(
            ColorExtractor::new(10).dominant_color(&frame(img)),
            Color::new(1, 200, 200)
        );
    }

    #[test]
    fn empty_frame_returns_sentinel() {
        let f = frame(RgbImage::new(0, 0));
        let extractor = ColorExtractor::default();
        assert_eq!(
            extractor.try_dominant_color(&f),
            Err(ExtractionError::EmptyRegion { width: 0, height: 0 })
        );
        assert_eq!(extractor.dominant_color(&f), Color::BLACK);
    }

    #[test]
    fn zero_sized_region_returns_sentinel() {
        let f = frame(uniform(50, 50, [5, 5, 5]));
        assert_eq!(ColorExtractor::new(0).dominant_color(&f), Color::BLACK);
    }
}
