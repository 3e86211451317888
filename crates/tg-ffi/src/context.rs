use std::sync::Arc;

use tg_kernel::{DefaultTiling, DispatchConfig, GemmBackend, ReferenceBackend, TiledCpuBackend};

use crate::types::TGBackendType;

/// Opaque context handle that owns the selected backend.
pub struct TGContext {
    pub backend: Arc<dyn GemmBackend>,
}

impl Default for TGContext {
    fn default() -> Self {
        Self::new(TGBackendType::TiledCpu)
    }
}

impl TGContext {
    /// Tiled backends read `TILEGEMM_THREADS` from the environment. The
    /// fallback setting is fixed by the backend type, not the environment.
    pub fn new(backend: TGBackendType) -> Self {
        let backend: Arc<dyn GemmBackend> = match backend {
            TGBackendType::TiledCpu => tiled(true),
            TGBackendType::TiledCpuStrict => tiled(false),
            TGBackendType::Reference => Arc::new(ReferenceBackend::new()),
        };
        log::debug!("created context with backend {}", backend.name());
        Self { backend }
    }
}

fn tiled(allow_fallback: bool) -> Arc<dyn GemmBackend> {
    Arc::new(TiledCpuBackend::<DefaultTiling>::new(
        DispatchConfig::from_env().with_fallback(allow_fallback),
    ))
}
