use std::marker::PhantomData;
use std::thread;

use log::{debug, trace, warn};

use crate::backend::GemmBackend;
use crate::buffer::MatrixBuf;
use crate::cpu::reference::ReferenceBackend;
use crate::cpu::DispatchConfig;
use crate::error::{GemmError, Result};
use crate::float4::Float4;
use crate::geometry::{DefaultTiling, Dim2};
use crate::kernel::LaneKernel;
use crate::params::GemmParams;

/// CPU emulation of the lane grid for tiling `T`.
///
/// C is cut into bands of `TILE_M` rows, one per work-group row. Each band is
/// a disjoint `&mut` slice owned by exactly one worker thread, which runs
/// every lane of every work-group in that band.
#[derive(Debug, Clone)]
pub struct TiledCpuBackend<T: LaneKernel = DefaultTiling> {
    config: DispatchConfig,
    reference: ReferenceBackend,
    _tiling: PhantomData<T>,
}

impl<T: LaneKernel> Default for TiledCpuBackend<T> {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl<T: LaneKernel> TiledCpuBackend<T> {
    pub fn new(config: DispatchConfig) -> Self {
        TiledCpuBackend {
            config,
            reference: ReferenceBackend::new(),
            _tiling: PhantomData,
        }
    }

    /// Run the full grid over raw float4 buffers.
    ///
    /// `params` must already have passed [`GemmParams::validate`] for `T` and
    /// [`GemmParams::check_buffers`] for these slices; violations panic inside
    /// a lane.
    pub fn launch(&self, params: &GemmParams, a: &[Float4], b: &[Float4], c: &mut [Float4]) {
        let grid = T::grid(params.m, params.n);
        let band_len = T::TILE_M * params.stride_c_vec();
        let threads = self.config.num_threads.clamp(1, grid.y.max(1));
        debug!(
            "sgemm {}x{}x{}: grid {} of {} ({}), {} thread(s)",
            params.m,
            params.n,
            params.k,
            grid,
            T::WORK_GROUP,
            T::describe(),
            threads
        );

        let mut bands: Vec<(usize, &mut [Float4])> =
            c.chunks_mut(band_len).take(grid.y).enumerate().collect();

        if threads == 1 {
            for (gy, band) in bands.iter_mut() {
                run_band::<T>(params, a, b, band, *gy, grid.x);
            }
            return;
        }

        let per_thread = bands.len().div_ceil(threads);
        thread::scope(|s| {
            for chunk in bands.chunks_mut(per_thread) {
                s.spawn(move || {
                    for (gy, band) in chunk.iter_mut() {
                        run_band::<T>(params, a, b, band, *gy, grid.x);
                    }
                });
            }
        });
    }
}

fn run_band<T: LaneKernel>(
    params: &GemmParams,
    a: &[Float4],
    b: &[Float4],
    band: &mut [Float4],
    gy: usize,
    groups_x: usize,
) {
    let row_base = gy * T::TILE_M;
    trace!("band {gy}: rows {}..{}", row_base, row_base + T::TILE_M);
    for gx in 0..groups_x {
        T::run_work_group(params, a, b, band, row_base, Dim2::new(gx, gy));
    }
}

impl<T: LaneKernel> GemmBackend for TiledCpuBackend<T> {
    fn name(&self) -> &str {
        "tiled-cpu"
    }

    fn sgemm(&self, a: &MatrixBuf, b: &MatrixBuf, c: &mut MatrixBuf) -> Result<()> {
        let params = GemmParams::from_buffers(a, b, c)?;
        match params.validate::<T>() {
            Ok(()) => {}
            Err(err @ GemmError::NotTileMultiple { .. }) if self.config.allow_fallback => {
                warn!("tiled kernel fallback: {err}; using {}", self.reference.name());
                return self.reference.sgemm(a, b, c);
            }
            Err(err) => return Err(err),
        }
        params.check_buffers(a.len_scalars(), b.len_scalars(), c.len_scalars())?;

        self.launch(&params, a.as_vec4(), b.as_vec4(), c.as_vec4_mut());
        Ok(())
    }
}
