//! Per-call handler context

use crate::command::ServiceRef;
use crate::session::SessionRef;
use core_types::{HandleId, ObjectId};
use ipc::{ByteReader, ByteWriter, CommandId, HandleDescriptor, Message};

/// State handed to a command handler for one call
///
/// Owned by the dispatching call and dropped once the response is composed.
/// The reader starts at the first parameter byte after the command header.
pub struct CallContext<'a> {
    session: &'a SessionRef,
    handle: HandleId,
    request: &'a Message,
    command_id: CommandId,
    reader: ByteReader<'a>,
    writer: ByteWriter,
    objects: Vec<ServiceRef>,
    copy_handles: Vec<HandleId>,
}

/// What a handler produced besides its result code
pub(crate) struct CallOutput {
    pub bytes: Vec<u8>,
    pub objects: Vec<ServiceRef>,
    pub copy_handles: Vec<HandleId>,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(
        session: &'a SessionRef,
        handle: HandleId,
        request: &'a Message,
        command_id: CommandId,
        parameters: ByteReader<'a>,
    ) -> Self {
        Self {
            session,
            handle,
            request,
            command_id,
            reader: parameters,
            writer: ByteWriter::new(),
            objects: Vec::new(),
            copy_handles: Vec::new(),
        }
    }

    /// The session the call arrived on
    pub fn session(&self) -> &SessionRef {
        self.session
    }

    /// The guest handle the call arrived through
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// The command being served
    pub fn command_id(&self) -> CommandId {
        self.command_id
    }

    /// Input parameters
    pub fn reader(&mut self) -> &mut ByteReader<'a> {
        &mut self.reader
    }

    /// Output parameters
    pub fn writer(&mut self) -> &mut ByteWriter {
        &mut self.writer
    }

    /// Handles the guest sent with the request
    pub fn request_handles(&self) -> Option<&HandleDescriptor> {
        self.request.handle_descriptor.as_ref()
    }

    /// Domain objects the guest sent with the request
    pub fn input_objects(&self) -> &[ObjectId] {
        self.request
            .domain
            .as_ref()
            .map(|header| header.input_objects.as_slice())
            .unwrap_or(&[])
    }

    /// Returns a new object to the guest
    ///
    /// On a domain session the object joins the domain; otherwise it gets a
    /// session handle of its own. Either way the registration happens after
    /// the handler returns.
    pub fn push_object(&mut self, object: ServiceRef) {
        self.objects.push(object);
    }

    /// Copies a handle into the response
    pub fn push_copy_handle(&mut self, handle: HandleId) {
        self.copy_handles.push(handle);
    }

    pub(crate) fn into_output(self) -> CallOutput {
        CallOutput {
            bytes: self.writer.into_bytes(),
            objects: self.objects,
            copy_handles: self.copy_handles,
        }
    }
}
