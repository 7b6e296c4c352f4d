//! Gaussian blur.
//!
//! Separable two-pass convolution with a kernel of radius `ceil(3 * sigma)`,
//! see [`gaussian_kernel_1d`]. Borders replicate edge pixels, so a uniform
//! image is a fixed point.

use tracing::debug;

use super::convolve::{apply_separable, gaussian_kernel_1d};
use crate::error::ImageResult;
use crate::image::Image;

/// Blur with standard deviation `sigma` (pixels). `sigma` must be positive.
pub fn gaussian_blur(image: &mut Image, sigma: f32) -> ImageResult<()> {
    let kernel = gaussian_kernel_1d(sigma)?;
    debug!(
        width = image.width(),
        height = image.height(),
        sigma,
        kernel_len = kernel.len(),
        "Applying gaussian blur"
    );
    apply_separable(image, &kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::error::ImageError;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_blur_uniform_is_fixed_point() {
        for sigma in [0.3, 1.0, 2.5] {
            let mut img = Image::filled(6, 5, Rgb::new(0.2, 0.5, 0.8)).unwrap();
            gaussian_blur(&mut img, sigma).unwrap();
            for c in img.pixels() {
                assert_abs_diff_eq!(c.r, 0.2, epsilon = 1e-5);
                assert_abs_diff_eq!(c.g, 0.5, epsilon = 1e-5);
                assert_abs_diff_eq!(c.b, 0.8, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_blur_zero_sigma_fails_unchanged() {
        let mut img = Image::from_fn(3, 3, |x, y| Rgb::gray((x + y) as f32 / 4.0)).unwrap();
        let before = img.clone();
        assert!(matches!(
            gaussian_blur(&mut img, 0.0),
            Err(ImageError::Validation(_))
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn test_blur_spreads_impulse_symmetrically() {
        let mut img = Image::new(7, 7).unwrap();
        img.set(3, 3, Rgb::WHITE);
        gaussian_blur(&mut img, 1.0).unwrap();

        let center = img.get(3, 3).unwrap().r;
        let left = img.get(2, 3).unwrap().r;
        let right = img.get(4, 3).unwrap().r;
        let up = img.get(3, 2).unwrap().r;
        assert!(center < 1.0);
        assert!(left > 0.0 && left < center);
        assert_abs_diff_eq!(left, right, epsilon = 1e-6);
        assert_abs_diff_eq!(left, up, epsilon = 1e-6);
    }

    #[test]
    fn test_blur_preserves_total_energy_inside() {
        // Impulse far from the borders keeps its mass
        let mut img = Image::new(15, 15).unwrap();
        img.set(7, 7, Rgb::WHITE);
        gaussian_blur(&mut img, 1.0).unwrap();
        let total: f32 = img.pixels().map(|c| c.r).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-4);
    }
}
