use crate::float4::Float4;
use crate::geometry::CTile;
use crate::unroll::Unroll;

/// Reset every accumulator of a register tile to the zero vector.
#[inline(always)]
pub fn zero_tile<const C_ROWS: usize, const C_COLS: usize>(tile: &mut CTile<C_ROWS, C_COLS>) {
    Unroll::<C_ROWS>::call(|i| {
        let row = &mut tile[i];
        Unroll::<C_COLS>::call(|j| row[j] = Float4::ZERO);
    });
}
