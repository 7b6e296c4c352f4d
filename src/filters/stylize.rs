//! Stylize filters: Vignette, Crystallize, Glass distortion.
//!
//! These are artistic effect filters. Crystallize and glass distortion draw
//! from a caller-supplied random source; every draw happens sequentially in
//! row-major order before the parallel pass, so a seeded generator gives the
//! same output regardless of the rayon thread count.

use rand::Rng;
use tracing::{debug, trace};

use crate::color::Rgb;
use crate::error::{ImageError, ImageResult};
use crate::image::Image;

// ============================================================================
// Vignette
// ============================================================================

/// Radial darkening toward the corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteParams {
    /// Darkening at the corner distance, before the floor is applied.
    pub strength: f32,
    /// Lowest brightness factor any pixel receives.
    pub min_factor: f32,
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self {
            strength: 0.7,
            min_factor: 0.3,
        }
    }
}

/// Vignette with the default strength 0.7 and floor 0.3.
pub fn vignette(image: &mut Image) -> ImageResult<()> {
    vignette_with(image, VignetteParams::default())
}

/// Scale each pixel by `max(min_factor, 1 - strength * d / dmax)`.
///
/// `d` is the distance from (x, y) to the center `(w/2, h/2)` and `dmax` is
/// the center's distance from the origin. Channels are clamped to at most 1.
pub fn vignette_with(image: &mut Image, params: VignetteParams) -> ImageResult<()> {
    if !params.strength.is_finite() || !params.min_factor.is_finite() {
        return Err(ImageError::Validation(format!(
            "vignette parameters must be finite, got {:?}",
            params
        )));
    }
    let (width, height) = image.dimensions();
    debug!(
        width,
        height,
        strength = params.strength,
        min_factor = params.min_factor,
        "Applying vignette"
    );

    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_distance = (cx * cx + cy * cy).sqrt();

    image.map_pixels_at(|x, y, c| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        let factor = (1.0 - distance / max_distance * params.strength).max(params.min_factor);
        (c * factor).min_one()
    });
    Ok(())
}

// ============================================================================
// Crystallize
// ============================================================================

/// Voronoi cell mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrystallizeParams {
    /// Number of random cell centers.
    pub cells: usize,
}

impl Default for CrystallizeParams {
    fn default() -> Self {
        Self { cells: 50 }
    }
}

/// Crystallize with 50 cells.
pub fn crystallize<R: Rng + ?Sized>(image: &mut Image, rng: &mut R) -> ImageResult<()> {
    crystallize_with(image, CrystallizeParams::default(), rng)
}

/// Partition the image into cells around random centers.
///
/// Each center captures the source color under it; every pixel takes the
/// color of its nearest center. Equal distances resolve to the center drawn
/// first.
pub fn crystallize_with<R: Rng + ?Sized>(
    image: &mut Image,
    params: CrystallizeParams,
    rng: &mut R,
) -> ImageResult<()> {
    if params.cells == 0 {
        return Err(ImageError::Validation(
            "crystallize needs at least one cell".to_string(),
        ));
    }
    let (width, height) = image.dimensions();
    debug!(width, height, cells = params.cells, "Applying crystallize");

    let mut centers: Vec<(i64, i64, Rgb)> = Vec::new();
    centers
        .try_reserve_exact(params.cells)
        .map_err(|e| ImageError::Allocation(format!("{} crystallize cells: {}", params.cells, e)))?;
    for _ in 0..params.cells {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        centers.push((x as i64, y as i64, image.at(x, y)));
    }
    trace!(?centers, "crystallize: centers drawn");

    let out = Image::from_fn(width, height, |x, y| {
        let (x, y) = (x as i64, y as i64);
        let mut best = centers[0].2;
        let mut best_distance = i64::MAX;
        for &(cx, cy, color) in &centers {
            let (dx, dy) = (x - cx, y - cy);
            let distance = dx * dx + dy * dy;
            if distance < best_distance {
                best_distance = distance;
                best = color;
            }
        }
        best
    })?;

    image.replace_with(out);
    Ok(())
}

// ============================================================================
// Glass distortion
// ============================================================================

/// Wavy displacement, as if seen through ribbed glass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlassParams {
    /// Angular frequency of the wave, radians per pixel.
    pub scale: f32,
    /// Wave amplitude in pixels.
    pub magnitude: f32,
    /// Random integer jitter added to each offset, drawn from `[-jitter, jitter]`.
    pub jitter: u32,
}

impl Default for GlassParams {
    fn default() -> Self {
        Self {
            scale: 0.05,
            magnitude: 10.0,
            jitter: 2,
        }
    }
}

/// Glass distortion with scale 0.05, magnitude 10 and jitter 2.
pub fn glass_distortion<R: Rng + ?Sized>(image: &mut Image, rng: &mut R) -> ImageResult<()> {
    glass_distortion_with(image, GlassParams::default(), rng)
}

/// Resample each pixel from a displaced position.
///
/// The source of (x, y) is `(x + trunc(sin(x * scale) * magnitude + jx),
/// y + trunc(cos(y * scale) * magnitude + jy))`, clamped to the image.
/// Per pixel, `jx` is drawn before `jy`.
pub fn glass_distortion_with<R: Rng + ?Sized>(
    image: &mut Image,
    params: GlassParams,
    rng: &mut R,
) -> ImageResult<()> {
    if !params.scale.is_finite() || !params.magnitude.is_finite() {
        return Err(ImageError::Validation(format!(
            "glass parameters must be finite, got {:?}",
            params
        )));
    }
    let (width, height) = image.dimensions();
    debug!(
        width,
        height,
        scale = params.scale,
        magnitude = params.magnitude,
        jitter = params.jitter,
        "Applying glass distortion"
    );

    let count = width * height;
    let mut jitter: Vec<(i64, i64)> = Vec::new();
    jitter
        .try_reserve_exact(count)
        .map_err(|e| ImageError::Allocation(format!("glass jitter for {} pixels: {}", count, e)))?;
    let j = i64::from(params.jitter);
    for _ in 0..count {
        let jx = rng.gen_range(-j..=j);
        let jy = rng.gen_range(-j..=j);
        jitter.push((jx, jy));
    }
    trace!(count, "glass: jitter drawn");

    let src = &*image;
    let out = Image::from_fn(width, height, |x, y| {
        let (jx, jy) = jitter[y * width + x];
        let ox = (x as f32 * params.scale).sin() * params.magnitude + jx as f32;
        let oy = (y as f32 * params.scale).cos() * params.magnitude + jy as f32;
        // Huge magnitudes saturate the casts; get_padded clamps the rest
        src.get_padded(
            (x as i64).saturating_add(ox as i64),
            (y as i64).saturating_add(oy as i64),
        )
    })?;

    image.replace_with(out);
    Ok(())
}
