//! Per-pixel color adjustments: Negative, Sepia.
//!
//! Both mutate the image in place; no neighbourhood reads.

use tracing::debug;

use crate::color::Rgb;
use crate::image::Image;

/// Sepia mixing matrix, rows produce R, G, B.
pub const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Invert every channel: `c -> 1 - c`.
pub fn negative(image: &mut Image) {
    debug!(width = image.width(), height = image.height(), "Applying negative");
    image.map_pixels(|c| c.map(|v| 1.0 - v));
}

/// Warm brown tone.
///
/// Channels are clamped to at most 1. All matrix entries are positive so
/// inputs in [0, 1] never go below zero.
pub fn sepia(image: &mut Image) {
    debug!(width = image.width(), height = image.height(), "Applying sepia");
    image.map_pixels(|c| {
        let [r, g, b] = SEPIA.map(|row| row[0] * c.r + row[1] * c.g + row[2] * c.b);
        Rgb::new(r, g, b).min_one()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_negative_white_is_black() {
        let mut img = Image::filled(1, 1, Rgb::WHITE).unwrap();
        negative(&mut img);
        assert_eq!(img.get(0, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_negative_is_involution() {
        let mut img = Image::from_fn(4, 3, |x, y| {
            Rgb::new(x as f32 * 0.2, y as f32 * 0.3, 0.7)
        })
        .unwrap();
        let before = img.clone();
        negative(&mut img);
        negative(&mut img);
        for (a, b) in before.pixels().zip(img.pixels()) {
            assert_abs_diff_eq!(a.r, b.r, epsilon = 1e-6);
            assert_abs_diff_eq!(a.g, b.g, epsilon = 1e-6);
            assert_abs_diff_eq!(a.b, b.b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sepia_white_clamps() {
        let mut img = Image::filled(1, 1, Rgb::WHITE).unwrap();
        sepia(&mut img);
        let c = img.get(0, 0).unwrap();
        // Row sums: 1.351, 1.203, 0.937
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 1.0);
        assert_abs_diff_eq!(c.b, 0.937, epsilon = 1e-6);
    }

    #[test]
    fn test_sepia_mid_gray() {
        let mut img = Image::filled(1, 1, Rgb::gray(0.5)).unwrap();
        sepia(&mut img);
        let c = img.get(0, 0).unwrap();
        assert_abs_diff_eq!(c.r, 0.6755, epsilon = 1e-6);
        assert_abs_diff_eq!(c.g, 0.6015, epsilon = 1e-6);
        assert_abs_diff_eq!(c.b, 0.4685, epsilon = 1e-6);
    }

    #[test]
    fn test_sepia_black_stays_black() {
        let mut img = Image::new(2, 2).unwrap();
        sepia(&mut img);
        assert!(img.pixels().all(|c| c == Rgb::BLACK));
    }
}
