use crate::backend::GemmBackend;
use crate::buffer::MatrixBuf;
use crate::error::Result;
use crate::params::GemmParams;

/// Straightforward triple-loop SGEMM.
///
/// Optimized for correctness rather than speed: used as the oracle in tests
/// and as the fallback for shapes the tiled kernel cannot cover.
#[derive(Debug, Clone, Default)]
pub struct ReferenceBackend;

impl ReferenceBackend {
    pub fn new() -> Self {
        ReferenceBackend
    }
}

impl GemmBackend for ReferenceBackend {
    fn name(&self) -> &str {
        "reference"
    }

    fn sgemm(&self, a: &MatrixBuf, b: &MatrixBuf, c: &mut MatrixBuf) -> Result<()> {
        let params = GemmParams::from_buffers(a, b, c)?;
        params.check_layout()?;

        for i in 0..params.m {
            for j in 0..params.n {
                let mut sum = 0.0f32;
                for p in 0..params.k {
                    sum += a.get(i, p) * b.get(p, j);
                }
                c.set(i, j, sum);
            }
        }
        Ok(())
    }
}
