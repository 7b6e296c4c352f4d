//! Windowed operations shared by the filters.
//!
//! - Fixed 3x3 kernel convolution
//! - Separable 1D convolution (horizontal then vertical)
//! - Per-channel median
//! - Gaussian kernel generation
//!
//! Every window samples through [`Image::get_padded`], so border pixels see
//! replicated edge values. Results are computed into a scratch image and
//! swapped in only once the whole pass has succeeded.

use tracing::trace;

use crate::color::Rgb;
use crate::error::{ImageError, ImageResult};
use crate::image::{Image, CHANNELS};

/// 3x3 kernel, indexed `[ky][kx]`.
pub type Kernel3 = [[f32; 3]; 3];

/// Weighted 3x3 sum centred on (x, y). Not clamped.
#[inline]
pub fn convolve_3x3_at(image: &Image, kernel: &Kernel3, x: usize, y: usize) -> Rgb {
    let (x, y) = (x as i64, y as i64);
    let mut sum = Rgb::BLACK;
    for (ky, row) in kernel.iter().enumerate() {
        for (kx, &weight) in row.iter().enumerate() {
            let px = image.get_padded(x + kx as i64 - 1, y + ky as i64 - 1);
            sum = sum + px * weight;
        }
    }
    sum
}

/// Convolve with a 3x3 kernel, clamping every channel to [0, 1].
pub fn apply_3x3(image: &mut Image, kernel: &Kernel3) -> ImageResult<()> {
    let (width, height) = image.dimensions();
    trace!(width, height, ?kernel, "apply_3x3");

    let src = &*image;
    let out = Image::from_fn(width, height, |x, y| {
        convolve_3x3_at(src, kernel, x, y).clamped()
    })?;
    image.replace_with(out);
    Ok(())
}

/// Convolve with `kernel` horizontally, then vertically.
///
/// The intermediate pass is not clamped; the final result is clamped to
/// [0, 1]. The kernel length must be odd.
pub fn apply_separable(image: &mut Image, kernel: &[f32]) -> ImageResult<()> {
    if kernel.len() % 2 == 0 {
        return Err(ImageError::Validation(format!(
            "separable kernel length must be odd, got {}",
            kernel.len()
        )));
    }
    let radius = ((kernel.len() - 1) / 2) as i64;
    let (width, height) = image.dimensions();
    trace!(width, height, radius, "apply_separable");

    let src = &*image;
    let horizontal = Image::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        kernel
            .iter()
            .enumerate()
            .fold(Rgb::BLACK, |sum, (i, &w)| {
                sum + src.get_padded(x + i as i64 - radius, y) * w
            })
    })?;

    let out = Image::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        kernel
            .iter()
            .enumerate()
            .fold(Rgb::BLACK, |sum, (i, &w)| {
                sum + horizontal.get_padded(x, y + i as i64 - radius) * w
            })
            .clamped()
    })?;

    image.replace_with(out);
    Ok(())
}

/// Per-channel median over a `window_size` x `window_size` neighbourhood.
///
/// Channels are ranked independently, so the output colour need not occur
/// in the window. `window_size` must be a positive odd number.
pub fn apply_median(image: &mut Image, window_size: usize) -> ImageResult<()> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(ImageError::Validation(format!(
            "window size must be a positive odd number, got {}",
            window_size
        )));
    }
    let count = window_size.checked_mul(window_size).ok_or_else(|| {
        ImageError::Allocation(format!("median window {} is too large", window_size))
    })?;
    // Fail up front rather than inside the parallel pass
    let mut probe: Vec<f32> = Vec::new();
    probe
        .try_reserve_exact(count.saturating_mul(CHANNELS))
        .map_err(|e| ImageError::Allocation(format!("median window {}: {}", window_size, e)))?;
    drop(probe);

    let radius = (window_size / 2) as i64;
    let mid = count / 2;
    let (width, height) = image.dimensions();
    trace!(width, height, window_size, "apply_median");

    let src = &*image;
    let out = Image::from_rows(width, height, |y, row| {
        let mut values: [Vec<f32>; CHANNELS] = [
            Vec::with_capacity(count),
            Vec::with_capacity(count),
            Vec::with_capacity(count),
        ];
        let y = y as i64;

        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let x = x as i64;
            for v in values.iter_mut() {
                v.clear();
            }
            for wy in -radius..=radius {
                for wx in -radius..=radius {
                    let c = src.get_padded(x + wx, y + wy);
                    values[0].push(c.r);
                    values[1].push(c.g);
                    values[2].push(c.b);
                }
            }
            for (out, v) in px.iter_mut().zip(values.iter_mut()) {
                let (_, median, _) = v.select_nth_unstable_by(mid, f32::total_cmp);
                *out = *median;
            }
        }
    })?;

    image.replace_with(out);
    Ok(())
}

/// Normalized 1D Gaussian kernel.
///
/// Radius is `ceil(3 * sigma)`, length `2 * radius + 1`, weights
/// `exp(-x^2 / (2 sigma^2))` scaled to sum to 1.
pub fn gaussian_kernel_1d(sigma: f32) -> ImageResult<Vec<f32>> {
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(ImageError::Validation(format!(
            "sigma must be a positive number, got {}",
            sigma
        )));
    }

    let radius = (3.0 * sigma).ceil() as usize;
    let len = radius
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| ImageError::Allocation(format!("gaussian kernel for sigma {}", sigma)))?;

    let mut kernel = Vec::new();
    kernel
        .try_reserve_exact(len)
        .map_err(|e| ImageError::Allocation(format!("gaussian kernel for sigma {}: {}", sigma, e)))?;

    let two_sigma_sq = 2.0 * sigma * sigma;
    for i in 0..len {
        let x = i as f32 - radius as f32;
        // Centre weight is exactly 1 even when 2 sigma^2 underflows to 0
        let w = if x == 0.0 { 1.0 } else { (-(x * x) / two_sigma_sq).exp() };
        kernel.push(w);
    }

    let sum: f32 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }

    Ok(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const IDENTITY: Kernel3 = [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]];

    fn checker(width: usize, height: usize) -> Image {
        Image::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb::new(0.9, 0.2, 0.4)
            } else {
                Rgb::new(0.1, 0.7, 0.3)
            }
        })
        .unwrap()
    }

    #[test]
    fn test_apply_3x3_identity() {
        let mut img = checker(5, 4);
        let before = img.clone();
        apply_3x3(&mut img, &IDENTITY).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_apply_3x3_box_uses_edge_padding() {
        let mut img = Image::new(3, 1).unwrap();
        img.set(0, 0, Rgb::gray(0.9));
        let k = [[1.0 / 9.0; 3]; 3];
        apply_3x3(&mut img, &k).unwrap();

        // Left pixel: columns (-1, 0, 1) -> (0, 0, 1), every row padded to y = 0
        assert_abs_diff_eq!(img.get(0, 0).unwrap().r, 0.6, epsilon = 1e-5);
        // Middle: columns 0, 1, 2
        assert_abs_diff_eq!(img.get(1, 0).unwrap().r, 0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(img.get(2, 0).unwrap().r, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_apply_3x3_clamps() {
        let mut img = Image::filled(2, 2, Rgb::gray(0.8)).unwrap();
        let double = [[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]];
        apply_3x3(&mut img, &double).unwrap();
        assert!(img.pixels().all(|c| c == Rgb::WHITE));

        let negate = [[0.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 0.0]];
        apply_3x3(&mut img, &negate).unwrap();
        assert!(img.pixels().all(|c| c == Rgb::BLACK));
    }

    #[test]
    fn test_separable_rejects_even_kernel() {
        let mut img = checker(3, 3);
        let before = img.clone();
        assert!(matches!(
            apply_separable(&mut img, &[0.5, 0.5]),
            Err(ImageError::Validation(_))
        ));
        assert!(apply_separable(&mut img, &[]).is_err());
        assert_eq!(img, before);
    }

    #[test]
    fn test_separable_identity() {
        let mut img = checker(4, 4);
        let before = img.clone();
        apply_separable(&mut img, &[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_separable_does_not_clamp_between_passes() {
        // Horizontal pass gives -0.8; clamping there would end at 0
        let mut img = Image::filled(3, 3, Rgb::gray(0.8)).unwrap();
        apply_separable(&mut img, &[-1.0]).unwrap();
        assert_abs_diff_eq!(img.get(1, 1).unwrap().r, 0.8, epsilon = 1e-6);

        // Final pass is clamped
        let mut img = Image::filled(3, 3, Rgb::gray(0.8)).unwrap();
        apply_separable(&mut img, &[0.0, 2.0, 0.0]).unwrap();
        assert!(img.pixels().all(|c| c == Rgb::WHITE));
    }

    #[test]
    fn test_median_rejects_even_and_zero() {
        let mut img = checker(3, 3);
        assert!(matches!(apply_median(&mut img, 4), Err(ImageError::Validation(_))));
        assert!(matches!(apply_median(&mut img, 0), Err(ImageError::Validation(_))));
    }

    #[test]
    fn test_median_removes_salt() {
        let mut img = Image::filled(5, 5, Rgb::gray(0.5)).unwrap();
        img.set(2, 2, Rgb::WHITE);
        apply_median(&mut img, 3).unwrap();
        assert_eq!(img.get(2, 2), Some(Rgb::gray(0.5)));
    }

    #[test]
    fn test_median_channels_are_independent() {
        // Three pixels in a row; window 3 on a 3x1 image sees each column three times
        let mut img = Image::new(3, 1).unwrap();
        img.set(0, 0, Rgb::new(0.1, 0.9, 0.5));
        img.set(1, 0, Rgb::new(0.2, 0.1, 0.9));
        img.set(2, 0, Rgb::new(0.3, 0.5, 0.1));
        apply_median(&mut img, 3).unwrap();
        // Centre window: r {.1,.2,.3}, g {.9,.1,.5}, b {.5,.9,.1}, each 3 times
        assert_eq!(img.get(1, 0), Some(Rgb::new(0.2, 0.5, 0.5)));
    }

    #[test]
    fn test_median_window_one_is_identity() {
        let mut img = checker(4, 3);
        let before = img.clone();
        apply_median(&mut img, 1).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_gaussian_kernel_shape() {
        let k = gaussian_kernel_1d(1.0).unwrap();
        assert_eq!(k.len(), 7);
        assert_abs_diff_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(k[0], k[6], epsilon = 1e-7);
        assert!(k[3] > k[2] && k[2] > k[1]);

        // ceil(3 * 0.5) = 2
        assert_eq!(gaussian_kernel_1d(0.5).unwrap().len(), 5);
        // ceil(3 * 0.34) = 2
        assert_eq!(gaussian_kernel_1d(0.34).unwrap().len(), 5);
    }

    #[test]
    fn test_gaussian_kernel_rejects_bad_sigma() {
        for sigma in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                gaussian_kernel_1d(sigma),
                Err(ImageError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_gaussian_kernel_tiny_sigma_is_delta() {
        let k = gaussian_kernel_1d(1e-30).unwrap();
        assert_eq!(k, vec![0.0, 1.0, 0.0]);
    }
}
