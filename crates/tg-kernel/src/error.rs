use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GemmError {
    #[error("shape mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    ShapeMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("output shape mismatch: expected [{expected_rows}x{expected_cols}], got [{rows}x{cols}]")]
    OutputMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("dimension {dim}={value} is not a multiple of the tile size {tile}")]
    NotTileMultiple {
        dim: char,
        value: usize,
        tile: usize,
    },
    #[error("dimension {0} must be non-zero")]
    ZeroDimension(char),
    #[error("{buffer}: stride {stride} is smaller than the row width {width}")]
    StrideTooSmall {
        buffer: &'static str,
        stride: usize,
        width: usize,
    },
    #[error("{buffer}: stride {stride} is not a multiple of 4")]
    UnalignedStride { buffer: &'static str, stride: usize },
    #[error("{buffer}: width {width} is not a multiple of 4")]
    UnalignedWidth { buffer: &'static str, width: usize },
    #[error("{buffer}: buffer holds {got} floats but the shape needs {needed}")]
    BufferTooSmall {
        buffer: &'static str,
        needed: usize,
        got: usize,
    },
    #[error("{buffer}: {rows} rows with stride {stride} overflow the address space")]
    SizeOverflow {
        buffer: &'static str,
        rows: usize,
        stride: usize,
    },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GemmError>;
