//! Frame annotation - hand skeleton and command captions

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::{Drawable, Pixel};
use gesture_pilot_core::landmarks::HAND_CONNECTIONS;
use gesture_pilot_core::{HandLandmarks, Point2};
use image::Rgb;
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use super::Frame;

/// Colors for overlay elements
mod colors {
    use embedded_graphics::pixelcolor::Rgb888;
    use image::Rgb;

    /// Joint dots
    pub const JOINT: Rgb<u8> = Rgb([255, 48, 48]);
    /// Bone lines
    pub const BONE: Rgb<u8> = Rgb([255, 255, 255]);
    /// Caption text
    pub const CAPTION: Rgb888 = Rgb888::new(0, 255, 0);
}

const JOINT_RADIUS: i32 = 3;

/// Caption baseline origin, in pixels from the top-left corner.
pub const CAPTION_ORIGIN: (i32, i32) = (50, 50);

/// Normalized range worth drawing; keeps line lengths bounded.
const NEAR_FRAME: std::ops::RangeInclusive<f32> = -1.0..=2.0;

fn to_pixel(p: Point2, width: u32, height: u32) -> (f32, f32) {
    (p.x * width as f32, p.y * height as f32)
}

/// Draw the hand skeleton onto `frame`. Off-frame pixels are clipped;
/// points far outside the frame or non-finite are skipped.
pub fn draw_hand(frame: &mut Frame, hand: &HandLandmarks) {
    let (w, h) = frame.dimensions();
    let drawable = |p: Point2| NEAR_FRAME.contains(&p.x) && NEAR_FRAME.contains(&p.y);

    for (a, b) in HAND_CONNECTIONS {
        let (pa, pb) = (hand.get(a), hand.get(b));
        if drawable(pa) && drawable(pb) {
            draw_line_segment_mut(frame, to_pixel(pa, w, h), to_pixel(pb, w, h), colors::BONE);
        }
    }
    for &p in hand.points() {
        if drawable(p) {
            let (x, y) = to_pixel(p, w, h);
            draw_filled_circle_mut(
                frame,
                (x.round() as i32, y.round() as i32),
                JOINT_RADIUS,
                colors::JOINT,
            );
        }
    }
}

/// `embedded-graphics` target over an RGB frame, clipped to its bounds.
struct FrameCanvas<'a>(&'a mut Frame);

impl OriginDimensions for FrameCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for FrameCanvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.0.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < w && y < h {
                self.0.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

/// Write `caption` onto `frame` with its baseline at [`CAPTION_ORIGIN`].
pub fn draw_caption(frame: &mut Frame, caption: &str) {
    let style = MonoTextStyle::new(&FONT_10X20, colors::CAPTION);
    let origin = Point::new(CAPTION_ORIGIN.0, CAPTION_ORIGIN.1);
    let text = Text::with_baseline(caption, origin, style, Baseline::Alphabetic);
    if let Err(never) = text.draw(&mut FrameCanvas(frame)) {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_pilot_core::LANDMARK_COUNT;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

    #[test]
    fn test_draw_hand_marks_joints_and_bones() {
        let mut frame = Frame::new(100, 100);
        let mut points = [Point2::new(0.5, 0.5); LANDMARK_COUNT];
        // Wrist to thumb base is the first connection.
        points[0] = Point2::new(0.1, 0.8);
        points[1] = Point2::new(0.9, 0.8);
        draw_hand(&mut frame, &HandLandmarks::new(points));

        assert_eq!(frame.get_pixel(50, 50), &colors::JOINT);
        assert_eq!(frame.get_pixel(10, 80), &colors::JOINT);
        assert_eq!(frame.get_pixel(50, 80), &colors::BONE);
        assert_eq!(frame.get_pixel(99, 0), &BLACK);
    }

    #[test]
    fn test_off_frame_points_are_skipped() {
        let mut frame = Frame::new(8, 8);
        let mut points = [Point2::new(-1.0, 2.0); LANDMARK_COUNT];
        points[0] = Point2::new(f32::NAN, 0.5);
        points[1] = Point2::new(1.0e9, 0.5);
        draw_hand(&mut frame, &HandLandmarks::new(points));
        assert!(frame.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_caption_drawn_near_origin() {
        let mut frame = Frame::new(400, 100);
        draw_caption(&mut frame, "Thumbs Up Command Executed!");

        let green: Vec<(u32, u32)> = frame
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == GREEN)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!green.is_empty());
        // Glyphs sit right of the origin and around its baseline.
        assert!(green.iter().all(|&(x, y)| x >= 50 && (30..60).contains(&y)));
    }

    #[test]
    fn test_caption_clipped_on_small_frame() {
        let mut frame = Frame::new(60, 60);
        draw_caption(&mut frame, "Image saved: Drone_images/image_20240309-120000.jpg");
        assert!(frame.pixels().any(|p| *p == GREEN));
    }
}
