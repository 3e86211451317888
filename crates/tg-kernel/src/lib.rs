//! `tg-kernel` - Register-tiled SGEMM micro-kernel for tilegemm.
//!
//! This crate provides:
//! - A `Float4` vector type and `MatrixBuf`, a row-major float4 matrix with an
//!   explicit row pitch
//! - `Tiling`, the compile-time tile geometry (work-group size, per-lane
//!   register tile, K-block depth)
//! - The per-lane kernel: register-tile zeroing, B-tile loads, float4
//!   outer-product accumulation and writeback, all unrolled at compile time
//! - A `GemmBackend` trait with a CPU grid dispatcher (`TiledCpuBackend`) and a
//!   naive `ReferenceBackend`

pub mod backend;
pub mod buffer;
pub mod cpu;
pub mod error;
pub mod float4;
pub mod geometry;
pub mod kernel;
pub mod params;
pub mod unroll;

// Re-export primary types at the crate root for convenience.
pub use backend::GemmBackend;
pub use buffer::MatrixBuf;
pub use cpu::{DispatchConfig, ReferenceBackend, TiledCpuBackend};
pub use error::{GemmError, Result};
pub use float4::Float4;
pub use geometry::{BTile, CTile, DefaultTiling, Dim2, TileShape, Tiling};
pub use kernel::LaneKernel;
pub use params::GemmParams;
pub use unroll::Unroll;
