//! Owned RGB pixel buffer.
//!
//! Pixels are stored as an `Array3<f32>` of shape (height, width, 3), always
//! in standard (row-major) layout. Width and height are never zero.
//!
//! ## Access
//!
//! - [`Image::get`] / [`Image::set`] are bounds-checked and accept any
//!   signed coordinate; out-of-range reads return `None`, writes are ignored.
//! - [`Image::get_padded`] clamps coordinates to the nearest edge pixel. This
//!   is what every windowed filter samples through, so a 3x3 or NxN window
//!   at the border is always well defined (edge replicate, never zero pad).

use ndarray::parallel::prelude::*;
use ndarray::{s, Array3, ArrayView3, Axis};
use rayon::prelude::*;

use crate::color::Rgb;
use crate::error::{ImageError, ImageResult};

/// Color channels per pixel.
pub const CHANNELS: usize = 3;

/// A rectangular grid of RGB samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Array3<f32>,
}

impl Image {
    /// Create a black image.
    ///
    /// Fails with [`ImageError::Dimension`] if either side is zero and with
    /// [`ImageError::Allocation`] if the pixel storage cannot be reserved.
    pub fn new(width: usize, height: usize) -> ImageResult<Self> {
        let flat = alloc_pixels(width, height)?;
        Self::from_flat(width, height, flat)
    }

    /// Create an image with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, color: Rgb) -> ImageResult<Self> {
        let mut image = Self::new(width, height)?;
        image.map_pixels(|_| color);
        Ok(image)
    }

    /// Build an image from a per-pixel function, evaluated row-parallel.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> ImageResult<Self>
    where
        F: Fn(usize, usize) -> Rgb + Sync,
    {
        Self::from_rows(width, height, |y, row| {
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                px.copy_from_slice(&f(x, y).to_array());
            }
        })
    }

    /// Build an image one row at a time, rows filled in parallel.
    ///
    /// `f(y, row)` receives the zeroed row as `width * 3` interleaved floats.
    pub fn from_rows<F>(width: usize, height: usize, f: F) -> ImageResult<Self>
    where
        F: Fn(usize, &mut [f32]) + Sync,
    {
        let mut flat = alloc_pixels(width, height)?;
        flat.par_chunks_mut(width * CHANNELS)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
        Self::from_flat(width, height, flat)
    }

    /// Wrap an existing (height, width, 3) array.
    pub fn from_array(data: Array3<f32>) -> ImageResult<Self> {
        let (height, width, channels) = data.dim();
        check_dimensions(width, height)?;
        if channels != CHANNELS {
            return Err(ImageError::Dimension(format!(
                "expected {} channels, got {}",
                CHANNELS, channels
            )));
        }
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Image { data })
    }

    /// Build from packed RGB bytes, row-major, top row first.
    pub fn from_rgb8(width: usize, height: usize, bytes: &[u8]) -> ImageResult<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| ImageError::Dimension(format!("{}x{} overflows", width, height)))?;
        if bytes.len() != expected {
            return Err(ImageError::Dimension(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                bytes.len()
            )));
        }
        Self::from_fn(width, height, |x, y| {
            let i = (y * width + x) * CHANNELS;
            Rgb::from_bytes(bytes[i], bytes[i + 1], bytes[i + 2])
        })
    }

    pub(crate) fn from_flat(width: usize, height: usize, flat: Vec<f32>) -> ImageResult<Self> {
        check_dimensions(width, height)?;
        let data = Array3::from_shape_vec((height, width, CHANNELS), flat)
            .map_err(|e| ImageError::Dimension(format!("{}x{}: {}", width, height, e)))?;
        Ok(Image { data })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// (width, height)
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Pixel at (x, y), or `None` when out of range.
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<Rgb> {
        let (x, y) = self.index(x, y)?;
        Some(self.at(x, y))
    }

    /// Overwrite the pixel at (x, y). Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: i64, y: i64, color: Rgb) {
        if let Some((x, y)) = self.index(x, y) {
            self.put(x, y, color);
        }
    }

    /// Pixel at (x, y) with coordinates clamped to the image edges.
    #[inline]
    pub fn get_padded(&self, x: i64, y: i64) -> Rgb {
        let x = x.clamp(0, self.width() as i64 - 1) as usize;
        let y = y.clamp(0, self.height() as i64 - 1) as usize;
        self.at(x, y)
    }

    #[inline]
    pub(crate) fn at(&self, x: usize, y: usize) -> Rgb {
        Rgb::new(self.data[[y, x, 0]], self.data[[y, x, 1]], self.data[[y, x, 2]])
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, color: Rgb) {
        self.data[[y, x, 0]] = color.r;
        self.data[[y, x, 1]] = color.g;
        self.data[[y, x, 2]] = color.b;
    }

    fn index(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width())?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height())?;
        Some((x, y))
    }

    /// Replace every pixel with `f(pixel)`, in place, row-parallel.
    pub fn map_pixels<F>(&mut self, f: F)
    where
        F: Fn(Rgb) -> Rgb + Sync + Send,
    {
        self.map_pixels_at(|_, _, c| f(c));
    }

    /// Like [`Image::map_pixels`] but `f` also receives (x, y).
    pub fn map_pixels_at<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, Rgb) -> Rgb + Sync + Send,
    {
        self.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut row)| {
                for (x, mut px) in row.outer_iter_mut().enumerate() {
                    let c = f(x, y, Rgb::new(px[0], px[1], px[2]));
                    px[0] = c.r;
                    px[1] = c.g;
                    px[2] = c.b;
                }
            });
    }

    /// Pixels in row-major order, top row first.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data
            .lanes(Axis(2))
            .into_iter()
            .map(|px| Rgb::new(px[0], px[1], px[2]))
    }

    /// Copy of the top-left `width` x `height` region.
    ///
    /// The requested size is clamped to this image's size first, so the
    /// result is `(min(width, self.width), min(height, self.height))`.
    pub fn cropped(&self, width: usize, height: usize) -> ImageResult<Image> {
        check_dimensions(width, height)?;
        let width = width.min(self.width());
        let height = height.min(self.height());

        let mut out = Image::new(width, height)?;
        out.data.assign(&self.data.slice(s![..height, ..width, ..]));
        Ok(out)
    }

    /// Crop in place. Dimensions and contents change together or not at all.
    pub fn resize_replace(&mut self, width: usize, height: usize) -> ImageResult<()> {
        *self = self.cropped(width, height)?;
        Ok(())
    }

    /// Swap in a fully computed scratch image of the same size.
    pub(crate) fn replace_with(&mut self, scratch: Image) {
        debug_assert_eq!(self.dimensions(), scratch.dimensions());
        *self = scratch;
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<f32> {
        self.data
    }

    /// Packed RGB bytes, row-major, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels().flat_map(Rgb::to_bytes).collect()
    }
}

fn check_dimensions(width: usize, height: usize) -> ImageResult<()> {
    if width == 0 || height == 0 {
        return Err(ImageError::Dimension(format!(
            "width and height must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

/// Zeroed flat storage for a `width` x `height` image, reserved fallibly.
pub(crate) fn alloc_pixels(width: usize, height: usize) -> ImageResult<Vec<f32>> {
    check_dimensions(width, height)?;
    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| {
            ImageError::Allocation(format!("{}x{} image overflows address space", width, height))
        })?;

    let mut flat = Vec::new();
    flat.try_reserve_exact(len)
        .map_err(|e| ImageError::Allocation(format!("{}x{} image: {}", width, height, e)))?;
    flat.resize(len, 0.0f32);
    Ok(flat)
}
