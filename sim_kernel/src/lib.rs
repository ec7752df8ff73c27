//! # Simulated Kernel
//!
//! This crate provides an in-process implementation of the collaborators the
//! IPC dispatcher needs: guest RAM, a handle table, a service registry and
//! the synchronous request syscall that ties them together.
//!
//! ## Purpose
//!
//! The simulated kernel allows testing the IPC path without an emulator:
//! - Runs under `cargo test`
//! - Shared across threads (every operation takes `&self`)
//! - Inspectable (handles, memory and the audit trail are all accessible)
//!
//! ## Syscall path
//!
//! [`SimulatedKernel::send_sync_request`] reads the request sub-frame from
//! guest memory, dispatches it on the session bound to the handle, and
//! writes the response sub-frame back into the same buffer.

pub mod error;
pub mod handle_table;
pub mod ipc_audit;
pub mod memory;

pub use error::SimError;
pub use handle_table::SimHandleTable;
pub use memory::GuestRam;

use core_types::{HandleId, ResultCode};
use ipc::{Message, MessageKind, RequestFrame, ResponseFrame};
use ipc_audit::{IpcAuditEvent, IpcAuditLog, IpcEvent};
use ipc_dispatch::{DispatchConfig, Dispatcher, ServiceRef, Session, SessionRef};
use kernel_api::{GuestMemory, HandleTable};
use services_registry::ServiceRegistry;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, info};

/// Tracing target for syscall events.
const KERNEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::syscall");

/// Guest message buffer used by the synchronous request syscall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpcBuffer {
    pub address: u64,
    pub size: usize,
}

impl IpcBuffer {
    pub fn new(address: u64, size: usize) -> Self {
        Self { address, size }
    }
}

/// Simulated kernel state
pub struct SimulatedKernel {
    memory: GuestRam,
    handles: SimHandleTable<SessionRef>,
    registry: RwLock<ServiceRegistry>,
    dispatcher: Dispatcher,
    /// Audit log for IPC operations (test-only)
    audit: Mutex<IpcAuditLog>,
}

impl SimulatedKernel {
    /// Creates a kernel over `memory` with the default dispatcher settings
    pub fn new(memory: GuestRam) -> Self {
        Self::with_config(memory, DispatchConfig::default())
    }

    pub fn with_config(memory: GuestRam, config: DispatchConfig) -> Self {
        Self {
            memory,
            handles: SimHandleTable::new(),
            registry: RwLock::new(ServiceRegistry::new()),
            dispatcher: Dispatcher::new(config),
            audit: Mutex::new(IpcAuditLog::new()),
        }
    }

    /// Replaces the handle table, e.g. to bound its capacity
    pub fn with_handle_table(mut self, handles: SimHandleTable<SessionRef>) -> Self {
        self.handles = handles;
        self
    }

    /// Registers a service factory under `name`
    pub fn register_service<F>(&self, name: &str, factory: F) -> Result<(), SimError>
    where
        F: Fn() -> ServiceRef + Send + Sync + 'static,
    {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(name, factory)?;
        Ok(())
    }

    /// Opens a Direct session on a fresh instance of the named service
    pub fn connect(&self, name: &str) -> Result<HandleId, SimError> {
        let service = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .open(name)?;
        let handle = self.handles.open_handle(Session::direct(service))?;

        info!(target: KERNEL_TARGET, handle = handle.as_raw(), service = name, "session opened");
        self.record(IpcEvent::SessionOpened {
            handle,
            service: name.to_string(),
        });
        Ok(handle)
    }

    /// Performs a synchronous IPC request
    ///
    /// `message` carries the framing the guest's IPC header described (kind,
    /// domain sub-header, handles); its payload is replaced by the bytes in
    /// `buffer`. On success the response sub-frame is written back to
    /// `buffer` and the response record is returned. A CloseSession request
    /// also releases `handle`. A response larger than `buffer` fails the call
    /// with nothing changed.
    pub fn send_sync_request(
        &self,
        handle: HandleId,
        message: Message,
        buffer: IpcBuffer,
    ) -> Result<Message, SimError> {
        let payload = self.memory.read_bytes(buffer.address, buffer.size)?;
        let request = Message {
            raw_payload: payload,
            ..message
        };
        let command_id = match request.kind {
            MessageKind::Request | MessageKind::Control => RequestFrame::decode(&request.raw_payload)
                .ok()
                .map(|frame| frame.command_id),
            _ => None,
        };

        let response = match self.dispatcher.dispatch_handle_within(
            &self.handles,
            handle,
            &request,
            buffer.size,
        ) {
            Ok(response) => response,
            Err(error) => {
                self.record(IpcEvent::Rejected {
                    handle,
                    kind: request.kind,
                    reason: error.to_string(),
                });
                return Err(error.into());
            }
        };

        self.memory.write_bytes(buffer.address, &response.raw_payload)?;

        let result = ResponseFrame::decode(&response.raw_payload)
            .map(|frame| frame.result)
            .unwrap_or(ResultCode::SUCCESS);
        debug!(
            target: KERNEL_TARGET,
            handle = handle.as_raw(),
            kind = %request.kind,
            result = result.as_raw(),
            "request completed"
        );
        self.record(IpcEvent::Dispatched {
            handle,
            kind: request.kind,
            command_id,
            result,
        });

        if request.kind == MessageKind::CloseSession {
            self.close_handle(handle)?;
        }
        Ok(response)
    }

    /// Releases a guest handle
    ///
    /// The session is torn down once its last handle is released.
    pub fn close_handle(&self, handle: HandleId) -> Result<(), SimError> {
        self.handles.close_handle(handle)?;
        debug!(target: KERNEL_TARGET, handle = handle.as_raw(), "handle closed");
        self.record(IpcEvent::HandleClosed { handle });
        Ok(())
    }

    /// Returns the session bound to `handle`
    pub fn session(&self, handle: HandleId) -> Option<SessionRef> {
        self.handles.get(handle)
    }

    pub fn memory(&self) -> &GuestRam {
        &self.memory
    }

    pub fn handles(&self) -> &SimHandleTable<SessionRef> {
        &self.handles
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns a snapshot of the IPC audit trail
    pub fn audit_log(&self) -> Vec<IpcAuditEvent> {
        self.audit().get_events().to_vec()
    }

    /// Clears the IPC audit trail
    pub fn clear_audit_log(&self) {
        self.audit().clear();
    }

    fn record(&self, event: IpcEvent) {
        self.audit().record_event(event);
    }

    fn audit(&self) -> MutexGuard<'_, IpcAuditLog> {
        self.audit.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
