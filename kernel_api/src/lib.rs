//! # Kernel API
//!
//! This crate defines the narrow contracts the IPC dispatcher consumes from
//! the rest of the emulated kernel.
//!
//! ## Contracts
//!
//! - [`GuestMemory`]: read request bytes from, and write response bytes to,
//!   guest memory
//! - [`HandleTable`]: allocate and rebind guest handles
//!
//! ## Non-Goals
//!
//! This crate does not say how guest memory is laid out or how handles are
//! represented. The simulated kernel provides in-process implementations;
//! an emulator provides its own.

pub mod error;
pub mod handles;
pub mod memory;

pub use error::KernelError;
pub use handles::HandleTable;
pub use memory::GuestMemory;
