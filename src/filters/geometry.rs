//! Geometry: Crop.

use tracing::debug;

use crate::error::{ImageError, ImageResult};
use crate::image::Image;

/// Top-left `width` x `height` region of `image` as a new image.
///
/// Both sides must be positive; a size larger than the image is clamped to
/// the image, so the result is `(min(width, w), min(height, h))`.
pub fn crop(image: &Image, width: i64, height: i64) -> ImageResult<Image> {
    if width <= 0 || height <= 0 {
        return Err(ImageError::Validation(format!(
            "crop size must be positive, got {}x{}",
            width, height
        )));
    }
    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "Applying crop"
    );
    let width = usize::try_from(width).unwrap_or(usize::MAX);
    let height = usize::try_from(height).unwrap_or(usize::MAX);
    image.cropped(width, height)
}

/// [`crop`], replacing `image` only on success.
pub fn crop_in_place(image: &mut Image, width: i64, height: i64) -> ImageResult<()> {
    *image = crop(image, width, height)?;
    Ok(())
}
