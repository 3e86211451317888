use crate::float4::Float4;
use crate::geometry::{BTile, CTile, Dim2, Tiling};
use crate::unroll::Unroll;

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    /// Rank-4 update of register row `i` from one float4 of A.
    ///
    /// Loads `A[gi][gk_vec + kk]` (float4 units) and, for every register
    /// column `j`, adds `splat(a.x) * B_reg[4kk]`, then the `y`, `z` and `w`
    /// terms against rows `4kk + 1 ..= 4kk + 3`, in that order.
    #[inline(always)]
    #[allow(clippy::too_many_arguments)]
    pub fn accumulate_row_block(
        a: &[Float4],
        stride_a_vec: usize,
        gi: usize,
        gk_vec: usize,
        kk: usize,
        i: usize,
        b_reg: &BTile<K_VEC, C_COLS>,
        c_reg: &mut CTile<C_ROWS, C_COLS>,
    ) {
        let a4 = a[gi * stride_a_vec + gk_vec + kk];
        let ax = Float4::splat(a4.x());
        let ay = Float4::splat(a4.y());
        let az = Float4::splat(a4.z());
        let aw = Float4::splat(a4.w());

        let rows = &b_reg[kk];
        let c_row = &mut c_reg[i];
        Unroll::<C_COLS>::call(|j| {
            c_row[j] += ax * rows[0][j];
            c_row[j] += ay * rows[1][j];
            c_row[j] += az * rows[2][j];
            c_row[j] += aw * rows[3][j];
        });
    }

    /// Fold one loaded K-block into every register row of the lane.
    ///
    /// `k` is the scalar offset of the block; each of the `K_VEC` sub-blocks
    /// of every row is handed to [`accumulate_row_block`](Self::accumulate_row_block).
    #[inline(always)]
    pub fn accumulate_k_block(
        a: &[Float4],
        stride_a_vec: usize,
        g_id: Dim2,
        lane_id: Dim2,
        k: usize,
        b_reg: &BTile<K_VEC, C_COLS>,
        c_reg: &mut CTile<C_ROWS, C_COLS>,
    ) {
        let gk_vec = k / 4;
        Unroll::<C_ROWS>::call(|i| {
            let gi = Self::global_row(g_id, lane_id, i);
            Unroll::<K_VEC>::call(|kk| {
                Self::accumulate_row_block(a, stride_a_vec, gi, gk_vec, kk, i, b_reg, c_reg);
            });
        });
    }
}
