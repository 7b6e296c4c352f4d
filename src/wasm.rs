//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Errors are
//! returned as `JsValue` strings and surface as exceptions on the JS side.

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::bmp;
use crate::error::ImageError;
use crate::image::Image;
use crate::registry::{parse_chain, FilterRegistry};

fn to_js(err: ImageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Packed RGB
// ============================================================================

/// Apply one filter to packed RGB bytes.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3), top row first
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `name` - Filter name or alias
/// * `args` - Positional filter arguments
/// * `seed` - Seed for randomized filters
///
/// # Returns
/// Flat array of RGB bytes. Crop returns fewer bytes than it was given.
#[wasm_bindgen]
pub fn apply_filter_rgb(
    data: &[u8],
    width: usize,
    height: usize,
    name: &str,
    args: Vec<String>,
    seed: u64,
) -> Result<Vec<u8>, JsValue> {
    let mut image = Image::from_rgb8(width, height, data).map_err(to_js)?;
    let mut rng = StdRng::seed_from_u64(seed);
    FilterRegistry::standard()
        .apply(name, &mut image, &args, &mut rng)
        .map_err(to_js)?;
    Ok(image.to_rgb8())
}

// ============================================================================
// Whole BMP files
// ============================================================================

/// Decode a BMP file, run a filter chain, and encode the result.
///
/// # Arguments
/// * `bytes` - Complete BMP file contents
/// * `chain` - Filters as typed on the command line, e.g. "-crop 64 64 -gs"
/// * `seed` - Seed for randomized filters
///
/// # Returns
/// Complete BMP file contents
#[wasm_bindgen]
pub fn process_bmp(bytes: &[u8], chain: &str, seed: u64) -> Result<Vec<u8>, JsValue> {
    let tokens: Vec<&str> = chain.split_whitespace().collect();
    let calls = parse_chain(tokens.as_slice()).map_err(to_js)?;

    let mut image = bmp::read_bmp(&mut Cursor::new(bytes)).map_err(to_js)?;
    let mut rng = StdRng::seed_from_u64(seed);
    FilterRegistry::standard()
        .apply_chain(&mut image, &calls, &mut rng)
        .map_err(to_js)?;

    let mut out = Vec::new();
    bmp::write_bmp(&mut out, &image).map_err(to_js)?;
    Ok(out)
}

/// Primary names of every available filter.
#[wasm_bindgen]
pub fn filter_names() -> Vec<String> {
    FilterRegistry::standard().names().map(str::to_string).collect()
}
