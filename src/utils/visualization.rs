//! Drawing helpers for inspecting augmented samples.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Draws pixel-format boxes onto an image as hollow rectangles.
///
/// The outline is drawn on the `[x_min, x_max] x [y_min, y_max]` pixels
/// inclusive; boxes with zero width or height (clipped remnants on an image
/// edge) still produce a visible line.
pub fn draw_boxes(image: &mut RgbImage, boxes: &[[i32; 4]], color: Rgb<u8>) {
    for b in boxes {
        let [x_min, y_min, x_max, y_max] = *b;
        let width = (x_max - x_min + 1).max(1) as u32;
        let height = (y_max - y_min + 1).max(1) as u32;
        draw_hollow_rect_mut(image, Rect::at(x_min, y_min).of_size(width, height), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_box_outline_pixels() {
        let mut image = RgbImage::new(20, 20);
        draw_boxes(&mut image, &[[2, 3, 10, 12]], Rgb([255, 0, 0]));

        assert_eq!(*image.get_pixel(2, 3), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(10, 12), Rgb([255, 0, 0]));
        // Interior stays untouched.
        assert_eq!(*image.get_pixel(5, 6), Rgb([0, 0, 0]));
    }
}
