//! Resilience Test Utilities
//!
//! This crate provides shared utilities for resilience and integration tests.
//!
//! ## Test Philosophy
//!
//! - **Safety under concurrency**: Guest threads share sessions and domains;
//!   registry invariants must hold however their calls interleave
//! - **Aliasing is normal**: Several handles may reach one session, and an
//!   object may outlive its registry entry while a call still holds it
//! - **End to end**: Calls go through guest memory and the syscall path, not
//!   straight into the dispatcher

use core_types::ResultCode;
use ipc::{encode_request, Message};
use ipc_dispatch::{CommandTable, ServiceRef, TableService};
use kernel_api::GuestMemory;
use sim_kernel::{GuestRam, IpcBuffer, SimError, SimulatedKernel};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Base address of the simulated guest RAM
pub const RAM_BASE: u64 = 0x8000_0000;

/// Size of the simulated guest RAM
pub const RAM_SIZE: usize = 0x10_000;

/// Size of one guest thread's message buffer
pub const MESSAGE_BUFFER_SIZE: usize = 0x100;

/// Service names registered by [`test_bootstrap`]
pub const ECHO_SERVICE: &str = "test:echo";
pub const OPENER_SERVICE: &str = "test:opener";
pub const COUNTER_SERVICE: &str = "test:counter";

/// Bootstrap helper for tests
///
/// Creates a kernel with the sample services registered.
pub fn test_bootstrap() -> SimulatedKernel {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let kernel = SimulatedKernel::new(GuestRam::new(RAM_BASE, RAM_SIZE));
    kernel
        .register_service(ECHO_SERVICE, echo_service)
        .expect("Failed to register echo service");
    kernel
        .register_service(OPENER_SERVICE, opener_service)
        .expect("Failed to register opener service");
    kernel
        .register_service(COUNTER_SERVICE, counter_service)
        .expect("Failed to register counter service");
    kernel
}

/// Command 5 writes `[1, 0, 0, 0]`; command 7 returns its u32 argument plus one
pub fn echo_service() -> ServiceRef {
    TableService::shared(
        ECHO_SERVICE,
        CommandTable::new()
            .with_command(5, |ctx| {
                ctx.writer().write_bytes(&[1, 0, 0, 0]);
                ResultCode::SUCCESS
            })
            .with_command(7, |ctx| match ctx.reader().read_u32() {
                Ok(value) => {
                    ctx.writer().write_u32(value.wrapping_add(1));
                    ResultCode::SUCCESS
                }
                Err(_) => ResultCode::from_raw(0x1_0000),
            }),
    )
}

/// Command 0 returns a new echo object
pub fn opener_service() -> ServiceRef {
    TableService::shared(
        OPENER_SERVICE,
        CommandTable::new().with_command(0, |ctx| {
            ctx.push_object(echo_service());
            ResultCode::SUCCESS
        }),
    )
}

/// Command 0 increments a per-instance counter and returns the new value
pub fn counter_service() -> ServiceRef {
    let count = Arc::new(AtomicU32::new(0));
    TableService::shared(
        COUNTER_SERVICE,
        CommandTable::new().with_command(0, move |ctx| {
            let value = count.fetch_add(1, Ordering::SeqCst) + 1;
            ctx.writer().write_u32(value);
            ResultCode::SUCCESS
        }),
    )
}

/// Message buffer of guest thread `thread`
pub fn thread_buffer(thread: usize) -> IpcBuffer {
    IpcBuffer::new(
        RAM_BASE + (thread * MESSAGE_BUFFER_SIZE) as u64,
        MESSAGE_BUFFER_SIZE,
    )
}

/// Writes `message`'s payload into the thread's zeroed buffer and issues
/// the call
pub fn guest_call(
    kernel: &SimulatedKernel,
    thread: usize,
    handle: core_types::HandleId,
    message: Message,
) -> Result<Message, SimError> {
    let buffer = thread_buffer(thread);
    let mut bytes = message.raw_payload.clone();
    bytes.resize(buffer.size, 0);
    kernel.memory().write_bytes(buffer.address, &bytes)?;
    kernel.send_sync_request(handle, message, buffer)
}

/// Builds a plain request message for `command_id`
pub fn request(command_id: u32, parameters: &[u8]) -> Message {
    Message::request(encode_request(command_id, parameters))
}

/// Builds a control message for `command_id`
pub fn control(command_id: u32, parameters: &[u8]) -> Message {
    Message::control(encode_request(command_id, parameters))
}
