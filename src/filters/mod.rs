//! Filter modules for image effects.
//!
//! Every filter operates on an owned [`Image`](crate::image::Image) of RGB
//! `f32` samples in 0.0-1.0 and validates its parameters before touching
//! pixels; a rejected call leaves the image unchanged.
//!
//! ## Architecture
//!
//! - **Per-pixel** filters (grayscale, negative, sepia, vignette) map the
//!   image in place, row-parallel.
//! - **Neighbourhood** filters (sharpen, edge, median, blur, crystallize,
//!   glass) compute into a scratch image and swap it in after the full pass.
//!   Windows sample with edge replication, never zero padding.
//! - **Randomized** filters take an injected `rand::Rng`.
//!
//! ## Filter Categories
//!
//! | Category | Filters |
//! |----------|---------|
//! | Geometry | crop |
//! | Color | grayscale, negative, sepia |
//! | Convolution | sharpen, edge_detection, gaussian_blur |
//! | Noise | median |
//! | Stylize | vignette, crystallize, glass_distortion |

pub mod convolve;

pub mod blur;
pub mod color_adjust;
pub mod edge;
pub mod geometry;
pub mod grayscale;
pub mod noise;
pub mod sharpen;
pub mod stylize;

pub use blur::gaussian_blur;
pub use color_adjust::{negative, sepia};
pub use edge::edge_detection;
pub use geometry::{crop, crop_in_place};
pub use grayscale::grayscale;
pub use noise::median;
pub use sharpen::sharpen;
pub use stylize::{
    crystallize, crystallize_with, glass_distortion, glass_distortion_with, vignette,
    vignette_with, CrystallizeParams, GlassParams, VignetteParams,
};
