use thiserror::Error;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("capacity must be a positive integer, got {0}")]
    InvalidCapacity(usize),

    #[error("average requested from an empty buffer")]
    EmptyBuffer,

    #[error("failed to allocate storage for {0} samples")]
    OutOfMemory(usize),

    #[error("sample is not a finite number: {0}")]
    NonFiniteSample(f64),
}
