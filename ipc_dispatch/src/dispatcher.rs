//! Command dispatch engine
//!
//! The dispatcher branches on the kind of the inbound message, resolves a
//! handler (service path) or runs a control command (control path), and
//! composes the response message. It never touches guest memory; the caller
//! writes the response payload back.
//!
//! A call either completes or leaves the handle table and domain registries
//! as it found them. Session rebinds, duplicated handles and returned objects
//! are committed only once the response is known to fit the caller's buffer.

use crate::command::ServiceRef;
use crate::config::{DispatchConfig, MagicPolicy};
use crate::context::{CallContext, CallOutput};
use crate::control::{handle_control, SessionMutation};
use crate::domain::{Domain, DomainObject};
use crate::error::{DispatchError, UnimplementedTarget};
use crate::session::{Session, SessionRef};
use core_types::{HandleId, ObjectId, ResultCode};
use ipc::{
    encode_response, encode_response_words, DomainCommand, HandleDescriptor, Message,
    MessageKind, RequestFrame,
};
use kernel_api::{HandleTable, KernelError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tracing target for dispatch events.
const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Routes inbound messages to handlers and control commands
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

/// One inbound message and where it arrived
struct Call<'a> {
    handles: &'a dyn HandleTable<SessionRef>,
    handle: HandleId,
    session: &'a SessionRef,
    request: &'a Message,
    /// Largest response payload the caller can accept
    capacity: usize,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Dispatches `request` on the session bound to `handle`
    pub fn dispatch_handle(
        &self,
        handles: &dyn HandleTable<SessionRef>,
        handle: HandleId,
        request: &Message,
    ) -> Result<Message, DispatchError> {
        self.dispatch_handle_within(handles, handle, request, usize::MAX)
    }

    /// Dispatches `request` on the session bound to `handle`, with a response
    /// payload of at most `capacity` bytes
    ///
    /// A response that would not fit fails with
    /// [`DispatchError::ResponseTooLarge`] before the session, the handle
    /// table or the domain registry is changed.
    pub fn dispatch_handle_within(
        &self,
        handles: &dyn HandleTable<SessionRef>,
        handle: HandleId,
        request: &Message,
        capacity: usize,
    ) -> Result<Message, DispatchError> {
        let session = handles
            .get(handle)
            .ok_or(KernelError::InvalidHandle(handle))?;
        self.route(Call {
            handles,
            handle,
            session: &session,
            request,
            capacity,
        })
    }

    /// Dispatches `request` on `session`, reached through `handle`
    ///
    /// Returns the response message on success. Handler result codes are
    /// carried inside the response; only framing and resolution failures
    /// are returned as errors. Control commands that rebind or duplicate the
    /// session do so through `handles`.
    pub fn dispatch(
        &self,
        handles: &dyn HandleTable<SessionRef>,
        handle: HandleId,
        session: &SessionRef,
        request: &Message,
    ) -> Result<Message, DispatchError> {
        self.route(Call {
            handles,
            handle,
            session,
            request,
            capacity: usize::MAX,
        })
    }

    fn route(&self, call: Call<'_>) -> Result<Message, DispatchError> {
        debug!(
            target: DISPATCH_TARGET,
            handle = call.handle.as_raw(),
            kind = %call.request.kind,
            session = %call.session.kind(),
            "dispatching message"
        );

        let result = match call.request.kind {
            MessageKind::Request => self.dispatch_request(&call),
            MessageKind::Control => self.dispatch_control(&call),
            MessageKind::CloseSession => fit(close_response(), call.capacity),
            kind @ (MessageKind::Response | MessageKind::Other(_)) => {
                Err(DispatchError::ProtocolViolation { kind })
            }
        };

        if let Err(error) = &result {
            match error {
                DispatchError::Unimplemented { .. } => warn!(
                    target: DISPATCH_TARGET,
                    handle = call.handle.as_raw(),
                    error = %error,
                    "unimplemented"
                ),
                _ => debug!(
                    target: DISPATCH_TARGET,
                    handle = call.handle.as_raw(),
                    error = %error,
                    "dispatch failed"
                ),
            }
        }
        result
    }

    fn dispatch_request(&self, call: &Call<'_>) -> Result<Message, DispatchError> {
        let session = call.session;
        match session.as_ref() {
            Session::Direct(service) => {
                let frame = self.decode(call.request)?;
                self.invoke(call, service, frame)
            }
            Session::Wrapped(object) => {
                let frame = self.decode(call.request)?;
                let service = wrapped_service(object).ok_or_else(|| {
                    DispatchError::unimplemented(
                        UnimplementedTarget::Command(frame.command_id),
                        session.kind(),
                        session.service_name(),
                    )
                })?;
                self.invoke(call, &service, frame)
            }
            Session::Domain(domain) => {
                let header = call
                    .request
                    .domain
                    .as_ref()
                    .ok_or(DispatchError::MissingDomainHeader)?;

                match header.command {
                    DomainCommand::DeleteObject => {
                        let response = fit(
                            Message::response(encode_response(ResultCode::SUCCESS, &[])),
                            call.capacity,
                        )?;
                        domain.delete(header.object_id);
                        Ok(response)
                    }
                    DomainCommand::SendMessage => {
                        let frame = self.decode(call.request)?;
                        let object = domain.get(header.object_id).ok_or_else(|| {
                            DispatchError::unimplemented(
                                UnimplementedTarget::DomainObject(header.object_id),
                                session.kind(),
                                session.service_name(),
                            )
                        })?;
                        let service = match object {
                            DomainObject::Service(service) => service,
                            // A domain addressing itself is served by the
                            // owning session's table.
                            DomainObject::Domain(_) => Arc::clone(domain.owner()),
                        };
                        self.invoke(call, &service, frame)
                    }
                }
            }
        }
    }

    fn dispatch_control(&self, call: &Call<'_>) -> Result<Message, DispatchError> {
        let frame = self.decode(call.request)?;
        let outcome = handle_control(
            frame.command_id,
            call.session,
            call.request.domain_object_id(),
            frame.parameters(),
            &self.config,
        )?;

        let mut response = fit(
            Message::response(encode_response_words(ResultCode::SUCCESS, &outcome.words)),
            call.capacity,
        )?;

        match outcome.mutation {
            SessionMutation::None => {}
            SessionMutation::Rebind(rebound) => {
                call.handles.replace_handle_data(call.handle, rebound)?;
            }
            SessionMutation::Duplicate(alias) => {
                let duplicate = call.handles.open_handle(alias)?;
                response.handle_descriptor = Some(HandleDescriptor {
                    move_handles: vec![duplicate],
                    ..HandleDescriptor::default()
                });
            }
        }

        debug!(
            target: DISPATCH_TARGET,
            handle = call.handle.as_raw(),
            command_id = frame.command_id,
            "control command completed"
        );
        Ok(response)
    }

    fn invoke(
        &self,
        call: &Call<'_>,
        service: &ServiceRef,
        frame: RequestFrame<'_>,
    ) -> Result<Message, DispatchError> {
        let handler = service
            .command_table()
            .lookup(frame.command_id)
            .ok_or_else(|| {
                DispatchError::unimplemented(
                    UnimplementedTarget::Command(frame.command_id),
                    call.session.kind(),
                    service.name(),
                )
            })?;

        let mut context = CallContext::new(
            call.session,
            call.handle,
            call.request,
            frame.command_id,
            frame.parameters(),
        );
        let result = handler(&mut context);
        let output = context.into_output();

        debug!(
            target: DISPATCH_TARGET,
            handle = call.handle.as_raw(),
            service = service.name(),
            command_id = frame.command_id,
            result = result.as_raw(),
            "command handled"
        );

        self.compose_response(call, result, output)
    }

    fn compose_response(
        &self,
        call: &Call<'_>,
        result: ResultCode,
        output: CallOutput,
    ) -> Result<Message, DispatchError> {
        let mut response = fit(
            Message::response(encode_response(result, &output.bytes)),
            call.capacity,
        )?;
        let mut descriptor = HandleDescriptor {
            copy_handles: output.copy_handles,
            ..HandleDescriptor::default()
        };

        match call.session.as_domain() {
            Some(domain) => response.objects = register_objects(domain, output.objects)?,
            None => descriptor.move_handles = open_objects(call.handles, output.objects)?,
        }

        if !descriptor.is_empty() {
            response.handle_descriptor = Some(descriptor);
        }
        Ok(response)
    }

    fn decode<'a>(&self, request: &'a Message) -> Result<RequestFrame<'a>, DispatchError> {
        let frame = RequestFrame::decode(&request.raw_payload)?;
        if self.config.magic_policy == MagicPolicy::Reject {
            frame.check_magic()?;
        }
        Ok(frame)
    }
}

/// Adds returned objects to `domain`, all or none
fn register_objects(
    domain: &Domain,
    objects: Vec<ServiceRef>,
) -> Result<Vec<ObjectId>, DispatchError> {
    let mut added = Vec::with_capacity(objects.len());
    for object in objects {
        match domain.add_service(object) {
            Ok(id) => added.push(id),
            Err(error) => {
                for id in added {
                    domain.delete(id);
                }
                return Err(error.into());
            }
        }
    }
    Ok(added)
}

/// Opens a Direct session handle per returned object, all or none
fn open_objects(
    handles: &dyn HandleTable<SessionRef>,
    objects: Vec<ServiceRef>,
) -> Result<Vec<HandleId>, DispatchError> {
    let mut opened = Vec::with_capacity(objects.len());
    for object in objects {
        match handles.open_handle(Session::direct(object)) {
            Ok(handle) => opened.push(handle),
            Err(error) => {
                for handle in opened {
                    // Nothing else has seen these handles yet.
                    let _ = handles.close_handle(handle);
                }
                return Err(error.into());
            }
        }
    }
    Ok(opened)
}

/// Passes `response` through if its payload fits in `capacity` bytes
fn fit(response: Message, capacity: usize) -> Result<Message, DispatchError> {
    let size = response.raw_payload.len();
    if size > capacity {
        return Err(DispatchError::ResponseTooLarge { size, capacity });
    }
    Ok(response)
}

/// Service that serves a wrapped session, if it still exists
fn wrapped_service(object: &DomainObject) -> Option<ServiceRef> {
    match object {
        DomainObject::Service(service) => Some(Arc::clone(service)),
        DomainObject::Domain(weak) => weak.upgrade().map(|domain| Arc::clone(domain.owner())),
    }
}

/// Header-only success frame acknowledging a close
fn close_response() -> Message {
    Message::response(encode_response(ResultCode::SUCCESS, &[]))
}
