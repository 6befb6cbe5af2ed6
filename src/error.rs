use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cell ({row}, {col}) is outside the {height}x{width} maze")]
    OutOfBounds {
        row: usize,
        col: usize,
        height: usize,
        width: usize,
    },
    #[error("invalid direction: {0}")]
    InvalidDirection(i64),
    #[error("no maze has been generated for this session")]
    MazeUnbound,
    #[error("maze dimensions must be non-zero, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    #[error("expected {expected} pursuer positions, got {got}")]
    PursuerCount { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
