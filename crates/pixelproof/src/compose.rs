//! Side-by-side review images and placeholder graphics.

use crate::font::{draw_text, text_height, text_width};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Outer margin around the composed panels
pub const MARGIN: u32 = 20;
/// Gap between the implementation and design panels
pub const GAP: u32 = 40;
/// Header band holding the title and panel labels
pub const HEADER: u32 = 80;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LABEL: Rgba<u8> = Rgba([90, 90, 90, 255]);
const PLACEHOLDER_FILL: Rgba<u8> = Rgba([211, 211, 211, 255]);
const PLACEHOLDER_BORDER: Rgba<u8> = Rgba([200, 0, 0, 255]);

/// Scale `img` to `height`, preserving aspect ratio
#[must_use]
pub fn resize_to_height(img: &DynamicImage, height: u32) -> DynamicImage {
    let (width, current) = img.dimensions();
    if current == 0 || width == 0 || current == height {
        return img.clone();
    }
    let scaled = (f64::from(width) * f64::from(height) / f64::from(current)).round();
    let new_width = (scaled as u32).max(1);
    img.resize_exact(new_width, height.max(1), FilterType::Lanczos3)
}

/// Compose the implementation and design images side by side.
///
/// Both panels are scaled to the taller image's height. The canvas is
/// `w1 + w2 + 2 * MARGIN + GAP` wide and `h + HEADER + MARGIN` tall, with the
/// title at the top and a label above each panel.
#[must_use]
pub fn side_by_side(title: &str, implementation: &DynamicImage, design: &DynamicImage) -> RgbaImage {
    let height = implementation.height().max(design.height()).max(1);
    let left = resize_to_height(implementation, height).to_rgba8();
    let right = resize_to_height(design, height).to_rgba8();

    let width = left.width() + right.width() + MARGIN * 2 + GAP;
    let mut canvas = RgbaImage::from_pixel(width, height + HEADER + MARGIN, BACKGROUND);

    let right_x = MARGIN + left.width() + GAP;
    imageops::overlay(&mut canvas, &left, i64::from(MARGIN), i64::from(HEADER));
    imageops::overlay(&mut canvas, &right, i64::from(right_x), i64::from(HEADER));

    draw_text(&mut canvas, MARGIN, MARGIN, title, 3, INK);
    draw_text(&mut canvas, MARGIN, 52, "IMPLEMENTATION", 2, LABEL);
    draw_text(&mut canvas, right_x, 52, "DESIGN", 2, LABEL);
    canvas
}

/// Gray placeholder with a red border and centered lines of text
#[must_use]
pub fn placeholder(width: u32, height: u32, lines: &[&str]) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let mut canvas = RgbaImage::from_pixel(width, height, PLACEHOLDER_FILL);

    let border = 4.min(width / 2).min(height / 2);
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if x < border || y < border || x >= width - border || y >= height - border {
            *pixel = PLACEHOLDER_BORDER;
        }
    }

    let scale = if width >= 800 { 3 } else { 2 };
    let line_height = text_height(scale) + 2 * scale * 2;
    let block = line_height * lines.len() as u32;
    let mut y = height.saturating_sub(block) / 2;
    for line in lines {
        let x = width.saturating_sub(text_width(line, scale)) / 2;
        draw_text(&mut canvas, x, y, line, scale, INK);
        y += line_height;
    }
    canvas
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    #[test]
    fn test_resize_to_height_keeps_aspect() {
        let img = solid(200, 100, [1, 2, 3]);
        let resized = resize_to_height(&img, 50);
        assert_eq!(resized.dimensions(), (100, 50));
        let same = resize_to_height(&img, 100);
        assert_eq!(same.dimensions(), (200, 100));
    }

    #[test]
    fn test_side_by_side_geometry() {
        let implementation = solid(300, 200, [0, 74, 173]);
        let design = solid(150, 100, [0, 74, 173]);
        let canvas = side_by_side("Visual Review: inbox", &implementation, &design);

        // design scaled to 300x200
        assert_eq!(canvas.width(), 300 + 300 + 80);
        assert_eq!(canvas.height(), 200 + 100);
        assert_eq!(canvas.get_pixel(MARGIN + 10, HEADER + 10), &Rgba([0, 74, 173, 255]));
        assert_eq!(
            canvas.get_pixel(MARGIN + 300 + GAP + 150, HEADER + 100),
            &Rgba([0, 74, 173, 255])
        );
        // gap between the panels stays background
        assert_eq!(canvas.get_pixel(MARGIN + 300 + 5, HEADER + 10), &BACKGROUND);
    }

    #[test]
    fn test_side_by_side_draws_header() {
        let img = solid(100, 100, [255, 255, 255]);
        let canvas = side_by_side("Visual Review", &img, &img);
        let inked = (0..canvas.width())
            .flat_map(|x| (0..HEADER).map(move |y| (x, y)))
            .filter(|(x, y)| canvas.get_pixel(*x, *y) == &INK)
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_placeholder() {
        let img = placeholder(400, 300, &["Design missing"]);
        assert_eq!(img.dimensions(), (400, 300));
        assert_eq!(img.get_pixel(0, 0), &PLACEHOLDER_BORDER);
        assert_eq!(img.get_pixel(10, 10), &PLACEHOLDER_FILL);
        assert!(img.pixels().any(|p| *p == INK));
    }
}
