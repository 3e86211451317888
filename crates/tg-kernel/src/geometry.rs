use std::fmt;

use crate::float4::Float4;

/// A 2-D grid coordinate: a work-group id or a lane id within a work-group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dim2 {
    pub x: usize,
    pub y: usize,
}

impl Dim2 {
    pub const fn new(x: usize, y: usize) -> Self {
        Dim2 { x, y }
    }
}

impl fmt::Display for Dim2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Per-lane accumulator tile: `C_ROWS` rows of `C_COLS` float4.
pub type CTile<const C_ROWS: usize, const C_COLS: usize> = [[Float4; C_COLS]; C_ROWS];

/// Per-lane slice of B for one K-block.
///
/// Holds `TILE_K = 4 * K_VEC` rows of `C_COLS` float4, grouped by four:
/// `tile[kk][r]` is row `4 * kk + r` of the K-block.
pub type BTile<const K_VEC: usize, const C_COLS: usize> = [[[Float4; C_COLS]; 4]; K_VEC];

/// Compile-time tiling geometry of the kernel.
///
/// - `WG_X`, `WG_Y`: lanes per work-group along N and M
/// - `C_ROWS`, `C_COLS`: register tile of one lane, in float4 units
/// - `K_VEC`: float4 sub-blocks per K-block
///
/// The remaining constants are derived: one work-group covers
/// `TILE_M x TILE_N` outputs and consumes K in blocks of `TILE_K`.
/// Lanes of a work-group interleave: lane `(x, y)` owns rows
/// `y, y + WG_Y, ...` and float4 columns `x, x + WG_X, ...` of the
/// work-group's tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tiling<
    const WG_X: usize,
    const WG_Y: usize,
    const C_ROWS: usize,
    const C_COLS: usize,
    const K_VEC: usize,
>;

/// Geometry constants shared by every lane of a dispatch.
pub trait TileShape: Copy + Default + std::fmt::Debug + Send + Sync + 'static {
    /// Rows of C covered by one work-group.
    const TILE_M: usize;
    /// Columns of C covered by one work-group.
    const TILE_N: usize;
    /// `TILE_N` in float4 units.
    const TILE_N_VEC: usize;
    /// K extent of one block.
    const TILE_K: usize;
    /// Work-group dimensions.
    const WORK_GROUP: Dim2;

    /// Work-group grid needed to cover an `m x n` output.
    fn grid(m: usize, n: usize) -> Dim2 {
        Dim2::new(n / Self::TILE_N, m / Self::TILE_M)
    }

    /// Lanes per work-group.
    fn lanes() -> usize {
        Self::WORK_GROUP.x * Self::WORK_GROUP.y
    }

    /// Short human-readable description, used in logs.
    fn describe() -> String;
}

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > TileShape for Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    const TILE_M: usize = C_ROWS * WG_Y;
    const TILE_N: usize = 4 * C_COLS * WG_X;
    const TILE_N_VEC: usize = C_COLS * WG_X;
    const TILE_K: usize = 4 * K_VEC;
    const WORK_GROUP: Dim2 = Dim2::new(WG_X, WG_Y);

    fn describe() -> String {
        format!(
            "wg={}x{} reg={}x{} tile={}x{}x{}",
            WG_X,
            WG_Y,
            C_ROWS,
            C_COLS,
            Self::TILE_M,
            Self::TILE_N,
            Self::TILE_K
        )
    }
}

impl<
        const WG_X: usize,
        const WG_Y: usize,
        const C_ROWS: usize,
        const C_COLS: usize,
        const K_VEC: usize,
    > Tiling<WG_X, WG_Y, C_ROWS, C_COLS, K_VEC>
{
    /// Evaluated when a tiling is instantiated; a zero extent fails the build.
    pub(crate) const ASSERT_VALID: () = {
        assert!(WG_X > 0 && WG_Y > 0, "work-group dimensions must be non-zero");
        assert!(C_ROWS > 0 && C_COLS > 0, "register tile must be non-empty");
        assert!(K_VEC > 0, "K-block must hold at least one float4");
    };

    /// Global row of register row `i` for the given work-group and lane.
    #[inline(always)]
    pub const fn global_row(g_id: Dim2, lane_id: Dim2, i: usize) -> usize {
        g_id.y * <Self as TileShape>::TILE_M + lane_id.y + i * WG_Y
    }

    /// Global float4 column of register column `j` for the given work-group
    /// and lane.
    #[inline(always)]
    pub const fn global_col_vec(g_id: Dim2, lane_id: Dim2, j: usize) -> usize {
        g_id.x * <Self as TileShape>::TILE_N_VEC + lane_id.x + j * WG_X
    }
}

/// Tiling used by the C ABI and by default backends: 8x8 lanes, each holding
/// a 4x2 float4 register tile, K consumed 8 at a time.
pub type DefaultTiling = Tiling<8, 8, 4, 2, 2>;
