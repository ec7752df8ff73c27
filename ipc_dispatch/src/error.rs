//! Dispatch error taxonomy
//!
//! Only framing and resolution failures are errors here. Result codes
//! returned by handlers are payload and never surface as a `DispatchError`.

use crate::domain::ObjectIdsExhausted;
use crate::session::SessionKind;
use core_types::ObjectId;
use ipc::{CommandId, FrameError, MessageKind};
use kernel_api::KernelError;
use std::fmt;
use thiserror::Error;

/// What failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnimplementedTarget {
    /// A service command id with no handler
    Command(CommandId),
    /// A control command id outside the control table
    ControlCommand(CommandId),
    /// A domain object id that names nothing
    DomainObject(ObjectId),
}

impl fmt::Display for UnimplementedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnimplementedTarget::Command(id) => write!(f, "command {}", id),
            UnimplementedTarget::ControlCommand(id) => write!(f, "control command {}", id),
            UnimplementedTarget::DomainObject(id) => write!(f, "domain object {}", id.as_raw()),
        }
    }
}

/// Errors surfaced by a dispatch call
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler or object resolves for the request
    #[error("unimplemented {target} on {session} session of '{service}'")]
    Unimplemented {
        target: UnimplementedTarget,
        session: SessionKind,
        service: String,
    },

    /// The sub-frame could not be decoded
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FrameError),

    /// The message kind cannot be dispatched
    #[error("protocol violation: cannot dispatch a {kind} message")]
    ProtocolViolation { kind: MessageKind },

    /// A request on a domain session arrived without its domain sub-header
    #[error("protocol violation: domain session request without domain header")]
    MissingDomainHeader,

    /// A control command does not apply to the session's shape
    #[error("control command {command_id} cannot be applied to a {session} session")]
    InvalidControlTarget {
        command_id: CommandId,
        session: SessionKind,
    },

    /// The response does not fit the caller's message buffer
    #[error("response of {size} bytes exceeds the {capacity}-byte message buffer")]
    ResponseTooLarge { size: usize, capacity: usize },

    /// A domain could not register a returned object
    #[error("domain error: {0}")]
    Domain(#[from] ObjectIdsExhausted),

    /// A kernel collaborator failed
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

impl DispatchError {
    /// Creates an unimplemented error
    pub fn unimplemented(
        target: UnimplementedTarget,
        session: SessionKind,
        service: impl Into<String>,
    ) -> Self {
        Self::Unimplemented {
            target,
            session,
            service: service.into(),
        }
    }

    /// Returns true when the guest thread that issued the call should be
    /// terminated
    ///
    /// Guest protocol faults are fatal to the thread. Kernel collaborator
    /// failures are host-side problems and leave the decision to the caller.
    pub fn is_fatal_to_thread(&self) -> bool {
        match self {
            Self::Unimplemented { .. }
            | Self::MalformedFrame(_)
            | Self::ProtocolViolation { .. }
            | Self::MissingDomainHeader
            | Self::InvalidControlTarget { .. }
            | Self::ResponseTooLarge { .. } => true,
            Self::Domain(_) | Self::Kernel(_) => false,
        }
    }
}
