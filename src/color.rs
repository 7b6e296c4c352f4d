//! RGB color sample.
//!
//! Channels are stored as `f32` intensities, nominally 0.0-1.0. Arithmetic
//! never clamps; values are only clamped when converted to 8-bit bytes.

use std::ops::{Add, Mul};

/// ITU-R BT.601 luminance coefficients
pub const LUMA_R: f32 = 0.299;
pub const LUMA_G: f32 = 0.587;
pub const LUMA_B: f32 = 0.114;

/// A single RGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Same value in all three channels.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Rgb { r: v, g: v, b: v }
    }

    /// Build from 8-bit channels (0-255 -> 0.0-1.0).
    #[inline]
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to 8-bit channels.
    ///
    /// Each channel is clamped to [0, 1], scaled by 255 and rounded half up.
    /// The rounded value is clamped to 255 so no input can wrap around.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            channel_to_byte(self.r),
            channel_to_byte(self.g),
            channel_to_byte(self.b),
        ]
    }

    /// BT.601 luminance. Not clamped.
    #[inline]
    pub fn luminance(self) -> f32 {
        LUMA_R * self.r + LUMA_G * self.g + LUMA_B * self.b
    }

    /// Every channel clamped to [0, 1].
    #[inline]
    pub fn clamped(self) -> Self {
        self.map(|c| c.clamp(0.0, 1.0))
    }

    /// Every channel clamped to at most 1.
    #[inline]
    pub fn min_one(self) -> Self {
        self.map(|c| c.min(1.0))
    }

    /// Apply `f` to every channel.
    #[inline]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Rgb::new(f(self.r), f(self.g), f(self.b))
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

#[inline]
fn channel_to_byte(v: f32) -> u8 {
    // f32::max returns the non-NaN operand, so NaN becomes 0
    let v = v.max(0.0).min(1.0);
    (v * 255.0 + 0.5).floor().min(255.0) as u8
}

impl Add for Rgb {
    type Output = Rgb;

    #[inline]
    fn add(self, other: Rgb) -> Rgb {
        Rgb::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl Mul<f32> for Rgb {
    type Output = Rgb;

    #[inline]
    fn mul(self, scalar: f32) -> Rgb {
        Rgb::new(self.r * scalar, self.g * scalar, self.b * scalar)
    }
}

/// Channel-wise (Hadamard) product.
impl Mul<Rgb> for Rgb {
    type Output = Rgb;

    #[inline]
    fn mul(self, other: Rgb) -> Rgb {
        Rgb::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(v: [f32; 3]) -> Self {
        Rgb::new(v[0], v[1], v[2])
    }
}
