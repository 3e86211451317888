use crate::float4::Float4;
use crate::geometry::{BTile, Dim2, Tiling};
use crate::unroll::Unroll;

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    /// Fill `b_reg` with the lane's columns of the K-block starting at row `k`.
    ///
    /// Row `r` of the block comes from global row `k + r` of B, register
    /// column `j` from float4 column `global_col_vec(g_id, lane_id, j)`.
    /// `k` must be a multiple of 4 and every addressed row must exist in `b`;
    /// otherwise the slice access panics.
    #[inline(always)]
    pub fn load_b_tile(
        b: &[Float4],
        stride_b_vec: usize,
        g_id: Dim2,
        lane_id: Dim2,
        k: usize,
        b_reg: &mut BTile<K_VEC, C_COLS>,
    ) {
        Unroll::<C_COLS>::call(|j| {
            let gj = Self::global_col_vec(g_id, lane_id, j);
            Unroll::<K_VEC>::call(|kk| {
                let rows = &mut b_reg[kk];
                Unroll::<4>::call(|r| {
                    let gk = k + 4 * kk + r;
                    rows[r][j] = b[gk * stride_b_vec + gj];
                });
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MatrixBuf;

    /// B[r][c] = 100 * r + c, so every loaded scalar names its source.
    fn labelled(rows: usize, cols: usize, stride: usize) -> MatrixBuf {
        let data: Vec<f32> = (0..rows * cols)
            .map(|idx| (100 * (idx / cols) + idx % cols) as f32)
            .collect();
        MatrixBuf::from_rows_padded(&data, rows, cols, stride).unwrap()
    }

    #[test]
    fn test_load_single_lane() {
        type T = Tiling<1, 1, 1, 2, 1>;
        let b = labelled(8, 8, 8);
        let mut b_reg = [[[Float4::ZERO; 2]; 4]; 1];
        T::load_b_tile(b.as_vec4(), b.stride_vec(), Dim2::new(0, 0), Dim2::new(0, 0), 4, &mut b_reg);
        for r in 0..4 {
            let base = (100 * (4 + r)) as f32;
            assert_eq!(b_reg[0][r][0], Float4::new(base, base + 1.0, base + 2.0, base + 3.0));
            assert_eq!(b_reg[0][r][1], Float4::new(base + 4.0, base + 5.0, base + 6.0, base + 7.0));
        }
    }

    #[test]
    fn test_load_interleaved_lanes() {
        // Two lanes along N, two register columns each: lane x owns float4
        // columns x and x + 2 of the work-group.
        type T = Tiling<2, 1, 1, 2, 2>;
        let b = labelled(8, 32, 40);
        let mut b_reg = [[[Float4::ZERO; 2]; 4]; 2];
        let g = Dim2::new(1, 0);
        let lane = Dim2::new(1, 0);
        T::load_b_tile(b.as_vec4(), b.stride_vec(), g, lane, 0, &mut b_reg);
        for kk in 0..2 {
            for r in 0..4 {
                let row = 4 * kk + r;
                // Work-group 1 starts at float4 column 4.
                assert_eq!(b_reg[kk][r][0].x(), (100 * row + 4 * 5) as f32);
                assert_eq!(b_reg[kk][r][1].x(), (100 * row + 4 * 7) as f32);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_load_out_of_range_panics() {
        type T = Tiling<1, 1, 1, 1, 1>;
        let b = labelled(4, 4, 4);
        let mut b_reg = [[[Float4::ZERO; 1]; 4]; 1];
        T::load_b_tile(b.as_vec4(), b.stride_vec(), Dim2::new(0, 0), Dim2::new(0, 0), 4, &mut b_reg);
    }
}
