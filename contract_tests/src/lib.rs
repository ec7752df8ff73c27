//! # Wire Contract Tests
//!
//! This crate provides "golden" tests for the IPC wire contract to ensure
//! it doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Bytes over structure**: Frames are checked against literal bytes,
//!   not against the encoder that produced them
//! - **Testability first**: Contract tests fail when the wire format changes
//! - **Mechanism not policy**: Define what must be stable, not how to use it
//!
//! ## Structure
//!
//! - `frame`: request/response sub-frame layout and magic tags
//! - `control`: control command ids and their outputs
//! - `domain`: domain sub-protocol tags and object id assignment
//! - `config`: the configuration document format

pub mod config;
pub mod control;
pub mod domain;
pub mod frame;

/// Common test helpers for contract validation
pub mod test_helpers {
    use core_types::HandleId;
    use ipc::Message;
    use ipc_dispatch::{DispatchError, Dispatcher, ServiceRef, Session, SessionRef};
    use kernel_api::HandleTable;
    use sim_kernel::SimHandleTable;

    /// Builds the 16-byte response header for `result` by hand
    pub fn response_header(result: i64) -> Vec<u8> {
        let mut bytes = b"SFCO".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&result.to_le_bytes());
        bytes
    }

    /// Builds request bytes by hand, with a full 8-byte command field
    pub fn raw_request(command_field: u64, parameters: &[u8]) -> Vec<u8> {
        let mut bytes = b"SFCI".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes.extend_from_slice(&command_field.to_le_bytes());
        bytes.extend_from_slice(parameters);
        bytes
    }

    /// Verifies two frames are byte-identical, with a readable failure
    pub fn verify_frame_contract(actual: &[u8], expected: &[u8]) {
        assert_eq!(
            actual, expected,
            "Wire frame changed: expected {:02x?}, got {:02x?}",
            expected, actual
        );
    }

    /// A handle table with one Direct session on `service`
    pub fn open_direct(service: ServiceRef) -> (SimHandleTable<SessionRef>, HandleId) {
        let handles = SimHandleTable::new();
        let handle = handles
            .open_handle(Session::direct(service))
            .expect("Failed to open handle");
        (handles, handle)
    }

    /// Dispatches `request` on `handle` with default settings
    pub fn dispatch(
        handles: &SimHandleTable<SessionRef>,
        handle: HandleId,
        request: &Message,
    ) -> Result<Message, DispatchError> {
        Dispatcher::default().dispatch_handle(handles, handle, request)
    }
}
