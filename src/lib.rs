//! image_craft: BMP loading, saving and filtering.
//!
//! Images are decoded from uncompressed 24-bit BMP files into an owned RGB
//! float buffer, run through a chain of filters, and encoded back.
//!
//! ## Image Format
//! - [`Image`]: (height, width, 3) `f32` samples, nominally 0.0-1.0
//! - [`Rgb`]: one pixel, converted to and from 8-bit with round-half-up
//!
//! ## Filters
//! Filters live in [`filters`] and are callable directly or by name through
//! [`FilterRegistry`], which is what the `image_craft` binary and the
//! Python/WASM bindings use.
//!
//! ## Features
//! - `python`: PyO3 module `image_craft` working on numpy arrays
//! - `wasm`: wasm-bindgen exports working on packed RGB bytes and BMP files

pub mod bmp;
pub mod color;
pub mod error;
pub mod filters;
pub mod image;
pub mod registry;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use color::Rgb;
pub use error::{ImageError, ImageResult};
pub use image::Image;
pub use registry::{parse_chain, FilterCall, FilterRegistry, FilterSpec};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyIOError, PyValueError};
    use pyo3::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::bmp;
    use crate::error::ImageError;
    use crate::image::Image;
    use crate::registry::FilterRegistry;

    fn to_py_err(err: ImageError) -> PyErr {
        match err {
            ImageError::Io(e) => PyIOError::new_err(e.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }

    fn to_image(array: PyReadonlyArray3<'_, f32>) -> PyResult<Image> {
        Image::from_array(array.as_array().to_owned()).map_err(to_py_err)
    }

    // ========================================================================
    // BMP I/O
    // ========================================================================

    /// Load a 24-bit BMP as a (height, width, 3) float32 array, values 0.0-1.0.
    #[pyfunction]
    pub fn load_bmp<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let image = bmp::load(path).map_err(to_py_err)?;
        Ok(image.into_array().into_pyarray(py))
    }

    /// Save a (height, width, 3) float32 array as a 24-bit BMP.
    ///
    /// Values are clamped to 0.0-1.0 and rounded to 8 bits.
    #[pyfunction]
    pub fn save_bmp(path: &str, image: PyReadonlyArray3<'_, f32>) -> PyResult<()> {
        let image = to_image(image)?;
        bmp::save(path, &image).map_err(to_py_err)
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Apply a filter by name.
    ///
    /// # Arguments
    /// * `image` - (height, width, 3) float32 array
    /// * `name` - Filter name or alias, e.g. "blur" or "gaussian_blur"
    /// * `args` - Positional arguments as strings, e.g. ["1.5"]
    /// * `seed` - Seed for randomized filters; entropy when omitted
    ///
    /// # Returns
    /// Filtered array. Crop may change its shape.
    #[pyfunction]
    #[pyo3(signature = (image, name, args=Vec::new(), seed=None))]
    pub fn apply_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        name: &str,
        args: Vec<String>,
        seed: Option<u64>,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let mut image = to_image(image)?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        FilterRegistry::standard()
            .apply(name, &mut image, &args, &mut rng)
            .map_err(to_py_err)?;
        Ok(image.into_array().into_pyarray(py))
    }

    /// Primary names of every available filter.
    #[pyfunction]
    pub fn filter_names() -> Vec<&'static str> {
        FilterRegistry::standard().names().collect()
    }

    #[pymodule]
    pub fn image_craft(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(load_bmp, m)?)?;
        m.add_function(wrap_pyfunction!(save_bmp, m)?)?;
        m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
        m.add_function(wrap_pyfunction!(filter_names, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::image_craft;
