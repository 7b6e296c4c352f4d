//! Sharpen filter.
//!
//! 3x3 Laplacian-style kernel:
//!
//! ```text
//!  0 -1  0
//! -1  5 -1
//!  0 -1  0
//! ```
//!
//! Border pixels sample replicated edges, so a uniform image is unchanged.

use tracing::debug;

use super::convolve::{apply_3x3, Kernel3};
use crate::error::ImageResult;
use crate::image::Image;

pub const SHARPEN_KERNEL: Kernel3 = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

pub fn sharpen(image: &mut Image) -> ImageResult<()> {
    debug!(width = image.width(), height = image.height(), "Applying sharpen");
    apply_3x3(image, &SHARPEN_KERNEL)
}
