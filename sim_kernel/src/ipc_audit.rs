//! IPC Audit Trail
//!
//! This module records every call that passes through the simulated kernel's
//! IPC path, along with handle lifecycle events, for verification in tests.
//!
//! ## Philosophy
//!
//! - Test-only: This is NOT production logging, it's for test verification
//! - Deterministic: Events carry a sequence number in recording order
//! - Queryable: Tests assert on the trail instead of scraping log output
//!
//! ## Example
//!
//! ```
//! use core_types::HandleId;
//! use sim_kernel::ipc_audit::{IpcAuditLog, IpcEvent};
//!
//! let mut audit_log = IpcAuditLog::new();
//! audit_log.record_event(IpcEvent::HandleClosed {
//!     handle: HandleId::from_raw(1),
//! });
//!
//! assert_eq!(audit_log.get_events().len(), 1);
//! assert_eq!(audit_log.get_events()[0].sequence, 0);
//! ```

use core_types::{HandleId, ResultCode};
use ipc::{CommandId, MessageKind};
use serde::{Deserialize, Serialize};

/// Something the IPC path did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpcEvent {
    /// A guest connected to a named service
    SessionOpened { handle: HandleId, service: String },
    /// A call completed and its response was written back
    Dispatched {
        handle: HandleId,
        kind: MessageKind,
        command_id: Option<CommandId>,
        result: ResultCode,
    },
    /// A call failed before a response could be composed
    Rejected {
        handle: HandleId,
        kind: MessageKind,
        reason: String,
    },
    /// A guest handle was released
    HandleClosed { handle: HandleId },
}

impl IpcEvent {
    /// The handle the event concerns
    pub fn handle(&self) -> HandleId {
        match self {
            IpcEvent::SessionOpened { handle, .. }
            | IpcEvent::Dispatched { handle, .. }
            | IpcEvent::Rejected { handle, .. }
            | IpcEvent::HandleClosed { handle } => *handle,
        }
    }
}

/// A recorded event with its position in the trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcAuditEvent {
    pub sequence: u64,
    pub event: IpcEvent,
}

/// Audit log for IPC operations
#[derive(Debug, Default)]
pub struct IpcAuditLog {
    /// Chronological list of events
    events: Vec<IpcAuditEvent>,
    next_sequence: u64,
}

impl IpcAuditLog {
    /// Creates a new empty audit log
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Records an event at the end of the trail
    pub fn record_event(&mut self, event: IpcEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.events.push(IpcAuditEvent { sequence, event });
    }

    /// Returns all recorded events
    pub fn get_events(&self) -> &[IpcAuditEvent] {
        &self.events
    }

    /// Returns events for a specific handle
    pub fn get_events_for_handle(&self, handle: HandleId) -> Vec<&IpcAuditEvent> {
        self.events
            .iter()
            .filter(|e| e.event.handle() == handle)
            .collect()
    }

    /// Counts events matching the predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&IpcEvent) -> bool,
    {
        self.events.iter().filter(|e| predicate(&e.event)).count()
    }

    /// Checks if any event matches the predicate
    pub fn has_event<F>(&self, predicate: F) -> bool
    where
        F: Fn(&IpcEvent) -> bool,
    {
        self.events.iter().any(|e| predicate(&e.event))
    }

    /// Clears all events; sequence numbers keep counting
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
