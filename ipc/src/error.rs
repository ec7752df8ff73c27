//! Frame decoding errors

use thiserror::Error;

/// Structural failures while decoding a sub-frame
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer ended before a fixed-size field
    #[error("frame truncated: needed {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    /// The magic tag does not match the expected direction
    #[error("bad frame magic: expected {expected:#x}, found {actual:#x}")]
    MagicMismatch { expected: u64, actual: u64 },
}
