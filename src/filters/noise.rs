//! Noise removal: Median.
//!
//! Robust against salt-and-pepper noise. Each channel is ranked on its own,
//! which can introduce slight colour fringing at strong colour edges.

use tracing::debug;

use super::convolve::apply_median;
use crate::error::ImageResult;
use crate::image::Image;

/// Median filter over a square window of side `window_size` (positive, odd).
pub fn median(image: &mut Image, window_size: usize) -> ImageResult<()> {
    debug!(
        width = image.width(),
        height = image.height(),
        window_size,
        "Applying median"
    );
    apply_median(image, window_size)
}
