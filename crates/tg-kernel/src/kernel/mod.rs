//! The per-lane SGEMM kernel.
//!
//! A lane owns a `C_ROWS x C_COLS` float4 register tile of C. It zeroes the
//! tile ([`tile`]), then for each K-block loads its slice of B ([`load`]) and
//! folds the matching float4s of A into the tile ([`accumulate`]), and finally
//! stores the tile ([`writeback`]). Lanes never communicate: they read A and B
//! and write disjoint elements of C.
//!
//! Nothing here validates its inputs. Shapes and buffer sizes are checked once
//! by [`GemmParams::validate`] and [`GemmParams::check_buffers`]; a lane handed
//! bad arguments panics on an out-of-range slice access.

pub mod accumulate;
pub mod load;
pub mod tile;
pub mod writeback;

pub use tile::zero_tile;

use crate::float4::Float4;
use crate::geometry::{BTile, CTile, Dim2, TileShape, Tiling};
use crate::params::GemmParams;

/// A tiling that can execute lanes.
pub trait LaneKernel: TileShape {
    /// Compute and store the output tile of lane `lane_id` in work-group
    /// `g_id`.
    ///
    /// `c` holds the rows of C from global row `row_base` on.
    #[allow(clippy::too_many_arguments)]
    fn run_lane(
        params: &GemmParams,
        a: &[Float4],
        b: &[Float4],
        c: &mut [Float4],
        row_base: usize,
        g_id: Dim2,
        lane_id: Dim2,
    );

    /// Run every lane of work-group `g_id`, one after another.
    fn run_work_group(
        params: &GemmParams,
        a: &[Float4],
        b: &[Float4],
        c: &mut [Float4],
        row_base: usize,
        g_id: Dim2,
    ) {
        let wg = Self::WORK_GROUP;
        for y in 0..wg.y {
            for x in 0..wg.x {
                Self::run_lane(params, a, b, c, row_base, g_id, Dim2::new(x, y));
            }
        }
    }

    /// Run the whole grid on the calling thread, writing into all of `c`.
    fn run_grid(params: &GemmParams, a: &[Float4], b: &[Float4], c: &mut [Float4]) {
        let grid = Self::grid(params.m, params.n);
        for gy in 0..grid.y {
            for gx in 0..grid.x {
                Self::run_work_group(params, a, b, c, 0, Dim2::new(gx, gy));
            }
        }
    }
}

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > LaneKernel for Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    fn run_lane(
        params: &GemmParams,
        a: &[Float4],
        b: &[Float4],
        c: &mut [Float4],
        row_base: usize,
        g_id: Dim2,
        lane_id: Dim2,
    ) {
        #[allow(clippy::let_unit_value)]
        let () = Self::ASSERT_VALID;

        let mut c_reg: CTile<C_ROWS, C_COLS> = [[Float4::default(); C_COLS]; C_ROWS];
        let mut b_reg: BTile<K_VEC, C_COLS> = [[[Float4::default(); C_COLS]; 4]; K_VEC];
        zero_tile(&mut c_reg);

        let stride_a_vec = params.stride_a_vec();
        let stride_b_vec = params.stride_b_vec();
        for k in (0..params.k).step_by(Self::TILE_K) {
            Self::load_b_tile(b, stride_b_vec, g_id, lane_id, k, &mut b_reg);
            Self::accumulate_k_block(a, stride_a_vec, g_id, lane_id, k, &b_reg, &mut c_reg);
        }

        Self::write_back(&c_reg, c, row_base, params.stride_c_vec(), g_id, lane_id);
    }
}
