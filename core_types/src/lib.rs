//! # Core Types
//!
//! This crate defines the identifiers shared by every layer of the IPC stack.
//!
//! ## Key Types
//!
//! - [`HandleId`]: A guest-visible handle allocated by the handle table
//! - [`ObjectId`]: An object inside a domain session
//! - [`ResultCode`]: The opaque 64-bit result written into responses

pub mod ids;
pub mod result;

pub use ids::{HandleId, ObjectId};
pub use result::ResultCode;
