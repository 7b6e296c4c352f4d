//! Sobel edge detection.
//!
//! The image is reduced to luminance, both Sobel gradients are taken over the
//! edge-padded luminance plane, and each pixel becomes pure white where the
//! gradient magnitude exceeds the threshold and pure black elsewhere.

use tracing::{debug, trace};

use super::convolve::{convolve_3x3_at, Kernel3};
use crate::color::Rgb;
use crate::error::{ImageError, ImageResult};
use crate::image::Image;

pub const SOBEL_X: Kernel3 = [[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]];
pub const SOBEL_Y: Kernel3 = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

/// Binary edge map. `threshold` must lie in [0, 1].
pub fn edge_detection(image: &mut Image, threshold: f32) -> ImageResult<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ImageError::Validation(format!(
            "threshold must be between 0 and 1, got {}",
            threshold
        )));
    }
    let (width, height) = image.dimensions();
    debug!(width, height, threshold, "Applying edge detection");

    let src = &*image;
    let luma = Image::from_fn(width, height, |x, y| Rgb::gray(src.at(x, y).luminance()))?;
    trace!(width, height, "edge_detection: luminance plane ready");

    let out = Image::from_fn(width, height, |x, y| {
        // Channels are equal, so red carries the gradient
        let gx = convolve_3x3_at(&luma, &SOBEL_X, x, y).r;
        let gy = convolve_3x3_at(&luma, &SOBEL_Y, x, y).r;
        if (gx * gx + gy * gy).sqrt() > threshold {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    })?;

    image.replace_with(out);
    Ok(())
}
