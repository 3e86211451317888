use std::ops::{Add, AddAssign, Mul};

use crate::error::{GemmError, Result};

/// A 4-wide single-precision vector, the unit of every load, store and
/// multiply-add in the kernel.
///
/// Arithmetic is component-wise IEEE-754 `f32`. `a * b + c` is evaluated as a
/// separate multiply and add, never contracted into a fused multiply-add, so a
/// given input always rounds the same way.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float4(pub [f32; 4]);

impl Float4 {
    /// The zero vector.
    pub const ZERO: Float4 = Float4([0.0; 4]);

    /// Create a vector from its four lanes.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Float4([x, y, z, w])
    }

    /// Broadcast a scalar to all four lanes.
    #[inline(always)]
    pub const fn splat(v: f32) -> Self {
        Float4([v; 4])
    }

    #[inline(always)]
    pub fn x(self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn y(self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn z(self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn w(self) -> f32 {
        self.0[3]
    }

    /// Returns the lanes as an array.
    pub fn to_array(self) -> [f32; 4] {
        self.0
    }

    /// Pack a scalar slice into float4 vectors.
    ///
    /// # Errors
    /// Returns an error if `data.len()` is not a multiple of 4.
    pub fn pack(data: &[f32]) -> Result<Vec<Float4>> {
        if data.len() % 4 != 0 {
            return Err(GemmError::UnalignedWidth {
                buffer: "input",
                width: data.len(),
            });
        }
        Ok(data
            .chunks_exact(4)
            .map(|c| Float4([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Flatten float4 vectors back into scalars.
    pub fn unpack(data: &[Float4]) -> Vec<f32> {
        data.iter().flat_map(|v| v.0).collect()
    }
}

impl Add for Float4 {
    type Output = Float4;

    #[inline(always)]
    fn add(self, rhs: Float4) -> Float4 {
        Float4([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
        ])
    }
}

impl AddAssign for Float4 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Float4) {
        *self = *self + rhs;
    }
}

impl Mul for Float4 {
    type Output = Float4;

    #[inline(always)]
    fn mul(self, rhs: Float4) -> Float4 {
        Float4([
            self.0[0] * rhs.0[0],
            self.0[1] * rhs.0[1],
            self.0[2] * rhs.0[2],
            self.0[3] * rhs.0[3],
        ])
    }
}
