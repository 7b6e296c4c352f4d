//! Grayscale conversion filter.
//!
//! Uses ITU-R BT.601 luma coefficients (see [`Rgb::luminance`]). The result
//! is stored back as R=G=B, so the image stays three-channel.

use tracing::debug;

use crate::color::Rgb;
use crate::image::Image;

/// Replace every pixel with its luminance, in place.
pub fn grayscale(image: &mut Image) {
    debug!(width = image.width(), height = image.height(), "Applying grayscale");
    image.map_pixels(|c| Rgb::gray(c.luminance()));
}
