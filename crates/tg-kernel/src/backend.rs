use std::fmt::Debug;

use crate::buffer::MatrixBuf;
use crate::error::{GemmError, Result};

/// Trait for pluggable SGEMM backends.
///
/// Operands are [`MatrixBuf`]s: row-major float4 storage with explicit row
/// pitches. A backend computes `C = A * B` over the logical extent of C and
/// leaves C's padding untouched.
pub trait GemmBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "tiled-cpu", "reference").
    fn name(&self) -> &str;

    /// Matrix multiplication into an existing buffer: C = A @ B.
    ///
    /// - `a`: shape [m, k]
    /// - `b`: shape [k, n]
    /// - `c`: shape [m, n], overwritten
    fn sgemm(&self, a: &MatrixBuf, b: &MatrixBuf, c: &mut MatrixBuf) -> Result<()>;

    /// Matrix multiplication on dense scalar slices: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    ///
    /// Widths that are not a multiple of 4 are zero-padded up to the next
    /// vector boundary before calling [`sgemm`](Self::sgemm), and the padding
    /// is stripped from the result.
    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        if a.len() != m * k {
            return Err(GemmError::Other(format!(
                "matmul: a.len()={} but expected m*k={}",
                a.len(),
                m * k
            )));
        }
        if b.len() != k * n {
            return Err(GemmError::Other(format!(
                "matmul: b.len()={} but expected k*n={}",
                b.len(),
                k * n
            )));
        }

        let k4 = k.next_multiple_of(4);
        let n4 = n.next_multiple_of(4);
        let a_buf = MatrixBuf::from_rows(&widen(a, m, k, k4, m), m, k4)?;
        let b_buf = MatrixBuf::from_rows(&widen(b, k, n, n4, k4), k4, n4)?;
        let mut c_buf = MatrixBuf::zeros(m, n4)?;
        self.sgemm(&a_buf, &b_buf, &mut c_buf)?;

        let dense = c_buf.to_dense();
        if n4 == n {
            return Ok(dense);
        }
        Ok(dense.chunks_exact(n4).flat_map(|row| row[..n].to_vec()).collect())
    }
}

/// Copy a `rows x cols` matrix into a zeroed `out_rows x out_cols` one.
fn widen(data: &[f32], rows: usize, cols: usize, out_cols: usize, out_rows: usize) -> Vec<f32> {
    if cols == out_cols && rows == out_rows {
        return data.to_vec();
    }
    let mut out = vec![0.0f32; out_rows * out_cols];
    for r in 0..rows {
        out[r * out_cols..r * out_cols + cols].copy_from_slice(&data[r * cols..(r + 1) * cols]);
    }
    out
}
