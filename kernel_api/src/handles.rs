//! Handle table contract

use crate::KernelError;
use core_types::HandleId;

/// Process-wide table mapping guest handles to kernel objects
///
/// The table is generic over the object type so that the dispatch layer can
/// store its own session values without this crate knowing about them.
/// Several handles may map to clones of the same object; the object lives as
/// long as any of them does.
///
/// # Example
///
/// ```
/// use core_types::HandleId;
/// use kernel_api::{HandleTable, KernelError};
///
/// fn alias<T: Clone, H: HandleTable<T>>(table: &H, handle: HandleId) -> Result<HandleId, KernelError> {
///     let object = table.get(handle).ok_or(KernelError::InvalidHandle(handle))?;
///     table.open_handle(object)
/// }
/// ```
pub trait HandleTable<T>: Send + Sync {
    /// Allocates a new handle referencing `object`
    fn open_handle(&self, object: T) -> Result<HandleId, KernelError>;

    /// Rebinds an existing handle to `object`
    fn replace_handle_data(&self, handle: HandleId, object: T) -> Result<(), KernelError>;

    /// Returns the object bound to `handle`
    fn get(&self, handle: HandleId) -> Option<T>;

    /// Releases `handle` and returns the object it referenced
    fn close_handle(&self, handle: HandleId) -> Result<T, KernelError>;
}
