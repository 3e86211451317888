use crate::buffer::MatrixBuf;
use crate::error::{GemmError, Result};
use crate::geometry::TileShape;

/// Shape and buffer pitches of one `C = A * B` dispatch.
///
/// Strides are row pitches in scalar (`f32`) units. Built once on the host,
/// validated, and then only read by the lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmParams {
    /// Rows of A and C.
    pub m: usize,
    /// Columns of B and C.
    pub n: usize,
    /// Columns of A, rows of B.
    pub k: usize,
    /// Row pitch of A.
    pub stride_a: usize,
    /// Row pitch of B.
    pub stride_b: usize,
    /// Row pitch of C.
    pub stride_c: usize,
}

impl GemmParams {
    /// Parameters for dense (unpadded) row-major buffers.
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        GemmParams {
            m,
            n,
            k,
            stride_a: k,
            stride_b: n,
            stride_c: n,
        }
    }

    /// Override the three row pitches.
    pub fn with_strides(mut self, stride_a: usize, stride_b: usize, stride_c: usize) -> Self {
        self.stride_a = stride_a;
        self.stride_b = stride_b;
        self.stride_c = stride_c;
        self
    }

    /// Derive parameters from the operand buffers.
    ///
    /// # Errors
    /// Returns an error if the inner dimensions of A and B disagree or C does
    /// not have shape `[a.rows x b.cols]`.
    pub fn from_buffers(a: &MatrixBuf, b: &MatrixBuf, c: &MatrixBuf) -> Result<Self> {
        if a.cols() != b.rows() {
            return Err(GemmError::ShapeMismatch {
                m: a.rows(),
                k: a.cols(),
                k2: b.rows(),
                n: b.cols(),
            });
        }
        if c.rows() != a.rows() || c.cols() != b.cols() {
            return Err(GemmError::OutputMismatch {
                expected_rows: a.rows(),
                expected_cols: b.cols(),
                rows: c.rows(),
                cols: c.cols(),
            });
        }
        Ok(GemmParams {
            m: a.rows(),
            n: b.cols(),
            k: a.cols(),
            stride_a: a.stride(),
            stride_b: b.stride(),
            stride_c: c.stride(),
        })
    }

    /// Row pitch of A in float4 units.
    #[inline(always)]
    pub fn stride_a_vec(&self) -> usize {
        self.stride_a / 4
    }

    /// Row pitch of B in float4 units.
    #[inline(always)]
    pub fn stride_b_vec(&self) -> usize {
        self.stride_b / 4
    }

    /// Row pitch of C in float4 units.
    #[inline(always)]
    pub fn stride_c_vec(&self) -> usize {
        self.stride_c / 4
    }

    /// Check the dimensions and pitches, independent of any tiling.
    ///
    /// # Errors
    /// Returns an error for zero dimensions, widths or pitches that are not a
    /// multiple of 4, or pitches narrower than their rows.
    pub fn check_layout(&self) -> Result<()> {
        for (dim, value) in [('M', self.m), ('N', self.n), ('K', self.k)] {
            if value == 0 {
                return Err(GemmError::ZeroDimension(dim));
            }
        }
        check_pitch("A", self.k, self.stride_a)?;
        check_pitch("B", self.n, self.stride_b)?;
        check_pitch("C", self.n, self.stride_c)?;
        Ok(())
    }

    /// Check that the shape is an exact multiple of the tiling, in addition
    /// to [`check_layout`](Self::check_layout).
    ///
    /// # Errors
    /// Returns `NotTileMultiple` for the first dimension that does not divide.
    pub fn validate<T: TileShape>(&self) -> Result<()> {
        self.check_layout()?;
        check_multiple('M', self.m, T::TILE_M)?;
        check_multiple('N', self.n, T::TILE_N)?;
        check_multiple('K', self.k, T::TILE_K)?;
        Ok(())
    }

    /// Check that scalar buffers of the given lengths hold every addressed
    /// element.
    ///
    /// # Errors
    /// Returns `BufferTooSmall` naming the first buffer that is too short.
    pub fn check_buffers(&self, a_len: usize, b_len: usize, c_len: usize) -> Result<()> {
        check_len("A", required_len("A", self.m, self.k, self.stride_a)?, a_len)?;
        check_len("B", required_len("B", self.k, self.n, self.stride_b)?, b_len)?;
        check_len("C", required_len("C", self.m, self.n, self.stride_c)?, c_len)?;
        Ok(())
    }

    /// Floating-point operations of the product.
    pub fn flops(&self) -> f64 {
        2.0 * self.m as f64 * self.n as f64 * self.k as f64
    }
}

/// Scalars a `rows x cols` matrix with the given pitch occupies: the last row
/// does not need its padding.
///
/// # Errors
/// Returns `SizeOverflow` if the length does not fit in `usize`.
pub fn required_len(
    buffer: &'static str,
    rows: usize,
    cols: usize,
    stride: usize,
) -> Result<usize> {
    if rows == 0 {
        return Ok(0);
    }
    (rows - 1)
        .checked_mul(stride)
        .and_then(|len| len.checked_add(cols))
        .ok_or(GemmError::SizeOverflow {
            buffer,
            rows,
            stride,
        })
}

fn check_pitch(buffer: &'static str, width: usize, stride: usize) -> Result<()> {
    if width % 4 != 0 {
        return Err(GemmError::UnalignedWidth { buffer, width });
    }
    if stride % 4 != 0 {
        return Err(GemmError::UnalignedStride { buffer, stride });
    }
    if stride < width {
        return Err(GemmError::StrideTooSmall {
            buffer,
            stride,
            width,
        });
    }
    Ok(())
}

fn check_multiple(dim: char, value: usize, tile: usize) -> Result<()> {
    if value % tile != 0 {
        return Err(GemmError::NotTileMultiple { dim, value, tile });
    }
    Ok(())
}

fn check_len(buffer: &'static str, needed: usize, got: usize) -> Result<()> {
    if got < needed {
        return Err(GemmError::BufferTooSmall {
            buffer,
            needed,
            got,
        });
    }
    Ok(())
}
