//! Simulated process handle table

use core_types::HandleId;
use kernel_api::{HandleTable, KernelError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// First handle value handed out
pub const FIRST_HANDLE: u32 = 0xd000;

/// Default number of live handles per table
pub const DEFAULT_HANDLE_CAPACITY: usize = 1024;

#[derive(Debug)]
struct HandleSlots<T> {
    entries: HashMap<HandleId, T>,
    next: u32,
}

/// Handle table shared by every guest thread of a process
///
/// Handle values are never reused within one table.
#[derive(Debug)]
pub struct SimHandleTable<T> {
    slots: Mutex<HandleSlots<T>>,
    capacity: usize,
}

impl<T> SimHandleTable<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HANDLE_CAPACITY)
    }

    /// Creates a table that holds at most `capacity` live handles
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HandleSlots {
                entries: HashMap::new(),
                next: FIRST_HANDLE,
            }),
            capacity,
        }
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `handle` is live
    pub fn contains(&self, handle: HandleId) -> bool {
        self.lock().entries.contains_key(&handle)
    }

    fn lock(&self) -> MutexGuard<'_, HandleSlots<T>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for SimHandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> HandleTable<T> for SimHandleTable<T> {
    fn open_handle(&self, object: T) -> Result<HandleId, KernelError> {
        let mut slots = self.lock();
        if slots.entries.len() >= self.capacity {
            return Err(KernelError::HandleTableExhausted);
        }
        let raw = slots.next;
        slots.next = raw.checked_add(1).ok_or(KernelError::HandleTableExhausted)?;
        let handle = HandleId::from_raw(raw);
        slots.entries.insert(handle, object);
        Ok(handle)
    }

    fn replace_handle_data(&self, handle: HandleId, object: T) -> Result<(), KernelError> {
        let mut slots = self.lock();
        let entry = slots
            .entries
            .get_mut(&handle)
            .ok_or(KernelError::InvalidHandle(handle))?;
        *entry = object;
        Ok(())
    }

    fn get(&self, handle: HandleId) -> Option<T> {
        self.lock().entries.get(&handle).cloned()
    }

    fn close_handle(&self, handle: HandleId) -> Result<T, KernelError> {
        self.lock()
            .entries
            .remove(&handle)
            .ok_or(KernelError::InvalidHandle(handle))
    }
}
