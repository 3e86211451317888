use tg_kernel::GemmError;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TGStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorShape = 2,
    ErrorLayout = 3,
    ErrorUnsupported = 4,
    ErrorInternal = 5,
}

impl From<&GemmError> for TGStatus {
    fn from(err: &GemmError) -> Self {
        match err {
            GemmError::ShapeMismatch { .. }
            | GemmError::OutputMismatch { .. }
            | GemmError::ZeroDimension(_) => TGStatus::ErrorShape,
            GemmError::StrideTooSmall { .. }
            | GemmError::UnalignedStride { .. }
            | GemmError::UnalignedWidth { .. }
            | GemmError::BufferTooSmall { .. }
            | GemmError::SizeOverflow { .. } => TGStatus::ErrorLayout,
            GemmError::NotTileMultiple { .. } => TGStatus::ErrorUnsupported,
            GemmError::Other(_) => TGStatus::ErrorInternal,
        }
    }
}

/// Compute backend type selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TGBackendType {
    /// Register-tiled kernel on the CPU lane grid; shapes that are not a
    /// tile multiple are computed by the reference loop.
    TiledCpu = 0,
    /// Naive triple loop.
    Reference = 1,
    /// Register-tiled kernel only; shapes that are not a tile multiple fail
    /// with `ErrorUnsupported`.
    TiledCpuStrict = 2,
}
