//! Message records exchanged with the framing layer
//!
//! The framing layer unwraps guest memory into a [`Message`] before dispatch
//! and wraps the returned [`Message`] back into guest memory afterwards. This
//! crate only defines the record; it never touches guest memory.

use core_types::{HandleId, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a message as classified by the framing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Service command routed through a command table
    Request,
    /// Session-level control command
    Control,
    /// The guest closed its session handle
    CloseSession,
    /// Outbound reply
    Response,
    /// Any raw command type the framing layer does not recognise
    Other(u16),
}

impl MessageKind {
    /// Classifies a raw command-type field
    ///
    /// The `WithContext` variants (6 and 7) carry an extra token that the
    /// framing layer strips, so they dispatch like their plain forms.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            2 => MessageKind::CloseSession,
            4 | 6 => MessageKind::Request,
            5 | 7 => MessageKind::Control,
            other => MessageKind::Other(other),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Request => write!(f, "request"),
            MessageKind::Control => write!(f, "control"),
            MessageKind::CloseSession => write!(f, "close-session"),
            MessageKind::Response => write!(f, "response"),
            MessageKind::Other(raw) => write!(f, "unknown({})", raw),
        }
    }
}

/// Domain sub-protocol command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainCommand {
    /// Route the payload to the addressed object
    SendMessage,
    /// Remove the addressed object from the domain
    DeleteObject,
}

impl DomainCommand {
    /// Parses the wire tag; unknown tags yield `None`
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(DomainCommand::SendMessage),
            1 => Some(DomainCommand::DeleteObject),
            _ => None,
        }
    }

    /// Returns the wire tag
    pub fn as_raw(&self) -> u8 {
        match self {
            DomainCommand::SendMessage => 0,
            DomainCommand::DeleteObject => 1,
        }
    }
}

/// Domain sub-header attached to messages on a domain channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainHeader {
    pub command: DomainCommand,
    /// Target object inside the domain
    pub object_id: ObjectId,
    /// Objects passed in alongside the request
    pub input_objects: Vec<ObjectId>,
}

impl DomainHeader {
    /// Creates a header addressing `object_id`
    pub fn new(command: DomainCommand, object_id: ObjectId) -> Self {
        Self {
            command,
            object_id,
            input_objects: Vec::new(),
        }
    }
}

/// Handles travelling with a message
///
/// Opaque to the dispatcher: inbound descriptors are handed to handlers
/// untouched, outbound descriptors are filled from handler and control
/// results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleDescriptor {
    /// Caller process ID, when the sender asked for it to be attached
    pub process_id: Option<u64>,
    /// Handles duplicated into the receiver
    pub copy_handles: Vec<HandleId>,
    /// Handles whose ownership moves to the receiver
    pub move_handles: Vec<HandleId>,
}

impl HandleDescriptor {
    /// Creates an empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no handles or process ID are attached
    pub fn is_empty(&self) -> bool {
        self.process_id.is_none() && self.copy_handles.is_empty() && self.move_handles.is_empty()
    }
}

/// A request or response unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    /// Present when the channel is multiplexing through a domain
    pub domain: Option<DomainHeader>,
    /// Command sub-frame bytes
    pub raw_payload: Vec<u8>,
    pub handle_descriptor: Option<HandleDescriptor>,
    /// Domain objects returned with a response
    pub objects: Vec<ObjectId>,
}

impl Message {
    /// Creates a message of `kind` carrying `raw_payload`
    pub fn new(kind: MessageKind, raw_payload: Vec<u8>) -> Self {
        Self {
            kind,
            domain: None,
            raw_payload,
            handle_descriptor: None,
            objects: Vec::new(),
        }
    }

    /// Creates a service request
    pub fn request(raw_payload: Vec<u8>) -> Self {
        Self::new(MessageKind::Request, raw_payload)
    }

    /// Creates a control request
    pub fn control(raw_payload: Vec<u8>) -> Self {
        Self::new(MessageKind::Control, raw_payload)
    }

    /// Creates a session close notification
    pub fn close_session() -> Self {
        Self::new(MessageKind::CloseSession, Vec::new())
    }

    /// Creates a response
    pub fn response(raw_payload: Vec<u8>) -> Self {
        Self::new(MessageKind::Response, raw_payload)
    }

    /// Attaches a domain sub-header
    pub fn with_domain(mut self, command: DomainCommand, object_id: ObjectId) -> Self {
        self.domain = Some(DomainHeader::new(command, object_id));
        self
    }

    /// Attaches a handle descriptor
    pub fn with_handles(mut self, descriptor: HandleDescriptor) -> Self {
        self.handle_descriptor = Some(descriptor);
        self
    }

    /// Returns true if the message travels through a domain
    pub fn is_domain(&self) -> bool {
        self.domain.is_some()
    }

    /// Returns the domain command, if any
    pub fn domain_command(&self) -> Option<DomainCommand> {
        self.domain.as_ref().map(|header| header.command)
    }

    /// Returns the addressed domain object, if any
    pub fn domain_object_id(&self) -> Option<ObjectId> {
        self.domain.as_ref().map(|header| header.object_id)
    }
}
