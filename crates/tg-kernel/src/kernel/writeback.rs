use crate::float4::Float4;
use crate::geometry::{CTile, Dim2, Tiling};
use crate::unroll::Unroll;

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    /// Index into `c` of register element `(i, j)`, where `c` starts at
    /// global row `row_base`.
    #[inline(always)]
    pub fn c_offset(
        g_id: Dim2,
        lane_id: Dim2,
        i: usize,
        j: usize,
        row_base: usize,
        stride_c_vec: usize,
    ) -> usize {
        let gi = Self::global_row(g_id, lane_id, i);
        let gj = Self::global_col_vec(g_id, lane_id, j);
        (gi - row_base) * stride_c_vec + gj
    }

    /// Store the lane's register tile into C.
    ///
    /// `c` holds the rows of C from `row_base` on; pass the whole buffer with
    /// `row_base = 0`. Nothing outside the lane's own elements is touched.
    #[inline(always)]
    pub fn write_back(
        c_reg: &CTile<C_ROWS, C_COLS>,
        c: &mut [Float4],
        row_base: usize,
        stride_c_vec: usize,
        g_id: Dim2,
        lane_id: Dim2,
    ) {
        Unroll::<C_ROWS>::call(|i| {
            let row = &c_reg[i];
            Unroll::<C_COLS>::call(|j| {
                c[Self::c_offset(g_id, lane_id, i, j, row_base, stride_c_vec)] = row[j];
            });
        });
    }

    /// Every float4 index the lane writes, in store order.
    pub fn output_offsets(g_id: Dim2, lane_id: Dim2, stride_c_vec: usize) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(C_ROWS * C_COLS);
        Unroll::<C_ROWS>::call(|i| {
            Unroll::<C_COLS>::call(|j| {
                offsets.push(Self::c_offset(g_id, lane_id, i, j, 0, stride_c_vec));
            });
        });
        offsets
    }
}
