//! Kernel error types

use core_types::HandleId;
use thiserror::Error;

/// Errors reported by kernel collaborators
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KernelError {
    /// Handle does not name a live object
    #[error("Invalid handle: {0}")]
    InvalidHandle(HandleId),

    /// Guest address range is not mapped
    #[error("Invalid guest address range: {address:#x}+{length:#x}")]
    InvalidAddress { address: u64, length: usize },

    /// No free slot left in the handle table
    #[error("Handle table exhausted")]
    HandleTableExhausted,

    /// Service not found
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
}
