use crate::error::{GemmError, Result};
use crate::float4::Float4;
use crate::params::required_len;

/// A row-major `f32` matrix stored as float4 vectors with an explicit row
/// pitch.
///
/// `stride` (in scalars) may exceed `cols`; the padding columns are carried
/// along but never read or written by the kernel. Both `cols` and `stride`
/// are multiples of 4 so that every row starts on a vector boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixBuf {
    data: Vec<Float4>,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl MatrixBuf {
    /// Create a zero-filled matrix with a dense pitch.
    ///
    /// # Errors
    /// Returns an error if `cols` is not a multiple of 4.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::zeros_with_stride(rows, cols, cols)
    }

    /// Create a zero-filled matrix with the given row pitch.
    ///
    /// # Errors
    /// Returns an error if `cols` or `stride` is not a multiple of 4, or if
    /// `stride < cols`.
    pub fn zeros_with_stride(rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_shape(cols, stride)?;
        Ok(MatrixBuf {
            data: vec![Float4::ZERO; rows * stride / 4],
            rows,
            cols,
            stride,
        })
    }

    /// Create a matrix from dense row-major scalars.
    ///
    /// # Errors
    /// Returns an error if `data.len() != rows * cols` or `cols` is not a
    /// multiple of 4.
    pub fn from_rows(data: &[f32], rows: usize, cols: usize) -> Result<Self> {
        Self::from_rows_padded(data, rows, cols, cols)
    }

    /// Create a matrix from dense row-major scalars, laying rows out with the
    /// given pitch. Padding is zero-filled.
    ///
    /// # Errors
    /// Returns an error if `data.len() != rows * cols` or the pitch is invalid.
    pub fn from_rows_padded(data: &[f32], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(GemmError::BufferTooSmall {
                buffer: "rows",
                needed: rows * cols,
                got: data.len(),
            });
        }
        let mut buf = Self::zeros_with_stride(rows, cols, stride)?;
        for (r, row) in data.chunks_exact(cols.max(1)).enumerate().take(rows) {
            let dst = buf.row_mut(r);
            for (v, chunk) in dst.iter_mut().zip(row.chunks_exact(4)) {
                *v = Float4([chunk[0], chunk[1], chunk[2], chunk[3]]);
            }
        }
        Ok(buf)
    }

    /// Wrap scalars that already use the given pitch, padding included.
    ///
    /// `data` must hold at least `(rows - 1) * stride + cols` scalars; a short
    /// final row is padded out to the full pitch.
    ///
    /// # Errors
    /// Returns an error if the pitch is invalid or `data` is too short.
    pub fn from_strided(data: &[f32], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_shape(cols, stride)?;
        let needed = required_len("strided", rows, cols, stride)?;
        if data.len() < needed {
            return Err(GemmError::BufferTooSmall {
                buffer: "strided",
                needed,
                got: data.len(),
            });
        }
        let padded = rows.checked_mul(stride).ok_or(GemmError::SizeOverflow {
            buffer: "strided",
            rows,
            stride,
        })?;
        let mut scalars = data[..data.len().min(padded)].to_vec();
        scalars.resize(padded, 0.0);
        Ok(MatrixBuf {
            data: Float4::pack(&scalars)?,
            rows,
            cols,
            stride,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row pitch in scalars.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row pitch in float4 vectors.
    pub fn stride_vec(&self) -> usize {
        self.stride / 4
    }

    /// The whole backing store, padding included.
    pub fn as_vec4(&self) -> &[Float4] {
        &self.data
    }

    /// Mutable access to the whole backing store, padding included.
    pub fn as_vec4_mut(&mut self) -> &mut [Float4] {
        &mut self.data
    }

    /// Backing store length in scalars.
    pub fn len_scalars(&self) -> usize {
        self.data.len() * 4
    }

    /// The logical vectors of row `r`, without padding.
    ///
    /// # Panics
    /// Panics if `r >= rows()`.
    pub fn row(&self, r: usize) -> &[Float4] {
        let start = r * self.stride_vec();
        &self.data[start..start + self.cols / 4]
    }

    /// Mutable logical vectors of row `r`, without padding.
    ///
    /// # Panics
    /// Panics if `r >= rows()`.
    pub fn row_mut(&mut self, r: usize) -> &mut [Float4] {
        let start = r * self.stride_vec();
        let end = start + self.cols / 4;
        &mut self.data[start..end]
    }

    /// Element `(r, c)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the logical extent.
    pub fn get(&self, r: usize, c: usize) -> f32 {
        assert!(r < self.rows && c < self.cols, "({r}, {c}) out of range");
        self.data[r * self.stride_vec() + c / 4].0[c % 4]
    }

    /// Set element `(r, c)`.
    ///
    /// # Panics
    /// Panics if the coordinate is outside the logical extent.
    pub fn set(&mut self, r: usize, c: usize, v: f32) {
        assert!(r < self.rows && c < self.cols, "({r}, {c}) out of range");
        let stride_vec = self.stride_vec();
        self.data[r * stride_vec + c / 4].0[c % 4] = v;
    }

    /// Fill every stored scalar, padding included.
    pub fn fill(&mut self, v: f32) {
        self.data.fill(Float4::splat(v));
    }

    /// Copy the logical extent out as dense row-major scalars.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.rows * self.cols);
        for r in 0..self.rows {
            out.extend(self.row(r).iter().flat_map(|v| v.0));
        }
        out
    }

    /// Largest absolute value in the logical extent.
    pub fn max_abs(&self) -> f32 {
        (0..self.rows)
            .flat_map(|r| self.row(r).iter().flat_map(|v| v.0))
            .fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

fn check_shape(cols: usize, stride: usize) -> Result<()> {
    if cols % 4 != 0 {
        return Err(GemmError::UnalignedWidth {
            buffer: "matrix",
            width: cols,
        });
    }
    if stride % 4 != 0 {
        return Err(GemmError::UnalignedStride {
            buffer: "matrix",
            stride,
        });
    }
    if stride < cols {
        return Err(GemmError::StrideTooSmall {
            buffer: "matrix",
            stride,
            width: cols,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = MatrixBuf::from_rows(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 2, 4).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 4);
        assert_eq!(m.stride(), 4);
        assert_eq!(m.get(1, 2), 7.0);
        assert_eq!(m.row(1), &[Float4::new(5.0, 6.0, 7.0, 8.0)]);
    }

    #[test]
    fn test_padded_layout() {
        let m = MatrixBuf::from_rows_padded(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 2, 4, 8)
            .unwrap();
        assert_eq!(m.stride_vec(), 2);
        assert_eq!(m.as_vec4().len(), 4);
        assert_eq!(m.as_vec4()[1], Float4::ZERO);
        assert_eq!(m.as_vec4()[2], Float4::new(5.0, 6.0, 7.0, 8.0));
        assert_eq!(m.to_dense(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_from_strided() {
        // Pitch 8, last row short.
        let data = [1.0, 2.0, 3.0, 4.0, -1.0, -1.0, -1.0, -1.0, 5.0, 6.0, 7.0, 8.0];
        let m = MatrixBuf::from_strided(&data, 2, 4, 8).unwrap();
        assert_eq!(m.to_dense(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(m.as_vec4()[1], Float4::splat(-1.0));
        assert!(MatrixBuf::from_strided(&data[..11], 2, 4, 8).is_err());
        assert!(matches!(
            MatrixBuf::from_strided(&data, usize::MAX / 4, 4, 8),
            Err(GemmError::SizeOverflow { buffer: "strided", .. })
        ));
    }

    #[test]
    fn test_set_and_fill() {
        let mut m = MatrixBuf::zeros_with_stride(2, 4, 8).unwrap();
        m.fill(f32::NAN);
        m.set(0, 3, 2.5);
        assert_eq!(m.get(0, 3), 2.5);
        assert!(m.get(1, 0).is_nan());
    }

    #[test]
    fn test_max_abs_ignores_padding() {
        let mut m = MatrixBuf::from_rows_padded(&[1.0, -3.0, 2.0, 0.5], 1, 4, 8).unwrap();
        m.as_vec4_mut()[1] = Float4::splat(100.0);
        assert_eq!(m.max_abs(), 3.0);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(MatrixBuf::zeros(2, 3).is_err());
        assert!(MatrixBuf::zeros_with_stride(2, 8, 4).is_err());
        assert!(MatrixBuf::zeros_with_stride(2, 4, 6).is_err());
        assert!(MatrixBuf::from_rows(&[1.0; 7], 2, 4).is_err());
    }
}
