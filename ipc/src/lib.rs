//! # Inter-Process Communication (IPC)
//!
//! This crate defines the message record and the command sub-frame codec
//! shared by the dispatcher, the simulated kernel and guest-side helpers.
//!
//! ## Architecture
//!
//! A [`Message`] is what the framing layer hands over after unwrapping guest
//! memory: a [`MessageKind`], an optional domain sub-header, handle
//! descriptors, and the raw sub-frame bytes. The sub-frame itself is a fixed
//! 16-byte header (magic tag plus command id or result code) followed by
//! command-specific bytes, read and written with [`ByteReader`] and
//! [`ByteWriter`].

pub mod buffer;
pub mod error;
pub mod frame;
pub mod message;

pub use buffer::{ByteReader, ByteWriter};
pub use error::FrameError;
pub use frame::{
    decode_response, encode_request, encode_response, encode_response_words, CommandId, RequestFrame,
    ResponseFrame, HEADER_SIZE, REQUEST_MAGIC, RESPONSE_MAGIC,
};
pub use message::{DomainCommand, DomainHeader, HandleDescriptor, Message, MessageKind};
