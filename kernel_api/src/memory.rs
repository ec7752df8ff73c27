//! Guest memory access contract

use crate::KernelError;

/// Byte-level access to emulated guest memory
///
/// Implementations are shared between guest threads, so both operations take
/// `&self` and synchronise internally. A borrow obtained through this trait
/// never outlives the call that made it.
pub trait GuestMemory: Send + Sync {
    /// Copies `length` bytes starting at `address`
    fn read_bytes(&self, address: u64, length: usize) -> Result<Vec<u8>, KernelError>;

    /// Writes `bytes` starting at `address`
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<(), KernelError>;
}
