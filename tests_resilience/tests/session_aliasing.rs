//! Session Aliasing Tests
//!
//! Validates that duplicated and wrapped handles keep working as other
//! handles to the same session are closed or objects are deleted.

use ipc::{DomainCommand, ResponseFrame};
use ipc_dispatch::{SessionKind, SELF_OBJECT_ID};
use sim_kernel::SimError;
use std::sync::Arc;
use tests_resilience::{
    control, guest_call, request, test_bootstrap, ECHO_SERVICE, OPENER_SERVICE,
};

/// Test: A duplicated handle outlives the original
#[test]
fn test_duplicate_survives_original_close() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(ECHO_SERVICE).expect("Failed to connect");

    let response = guest_call(&kernel, 0, handle, control(4, &[0; 4])).expect("Clone failed");
    let alias = response.handle_descriptor.expect("No handle moved").move_handles[0];
    assert!(Arc::ptr_eq(
        &kernel.session(handle).unwrap(),
        &kernel.session(alias).unwrap()
    ));

    guest_call(&kernel, 0, handle, ipc::Message::close_session()).expect("Close failed");
    assert!(kernel.session(handle).is_none());

    let response = guest_call(&kernel, 0, alias, request(5, &[])).expect("Alias call failed");
    let frame = ResponseFrame::decode(&response.raw_payload).unwrap();
    assert_eq!(frame.output, &[1, 0, 0, 0]);
}

/// Test: Promotion rebinds only the handle it was issued on
#[test]
fn test_promotion_rebinds_only_calling_handle() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(ECHO_SERVICE).expect("Failed to connect");
    let response = guest_call(&kernel, 0, handle, control(2, &[0; 4])).expect("Clone failed");
    let alias = response.handle_descriptor.unwrap().move_handles[0];

    guest_call(&kernel, 0, handle, control(0, &[])).expect("Promote failed");

    // The promoting handle is rebound; the duplicate keeps the old session.
    assert_eq!(kernel.session(handle).unwrap().kind(), SessionKind::Domain);
    assert_eq!(kernel.session(alias).unwrap().kind(), SessionKind::Direct);
}

/// Test: Objects returned by a handler can be wrapped and called directly
#[test]
fn test_wrapped_handle_to_domain_object() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(OPENER_SERVICE).expect("Failed to connect");
    guest_call(&kernel, 0, handle, control(0, &[])).expect("Promote failed");

    let open = request(0, &[]).with_domain(DomainCommand::SendMessage, SELF_OBJECT_ID);
    let response = guest_call(&kernel, 0, handle, open).expect("Open failed");
    let child = response.objects[0];
    assert_eq!(child.as_raw(), 2);

    let clone = control(2, &[0; 4]).with_domain(DomainCommand::SendMessage, child);
    let response = guest_call(&kernel, 0, handle, clone).expect("Clone failed");
    let wrapped = response.handle_descriptor.unwrap().move_handles[0];
    assert_eq!(kernel.session(wrapped).unwrap().kind(), SessionKind::Wrapped);

    // Deleting the registry entry does not invalidate the wrapped handle.
    let delete = request(0, &[]).with_domain(DomainCommand::DeleteObject, child);
    guest_call(&kernel, 0, handle, delete).expect("Delete failed");

    let response =
        guest_call(&kernel, 0, wrapped, request(7, &41u32.to_le_bytes())).expect("Call failed");
    let frame = ResponseFrame::decode(&response.raw_payload).unwrap();
    assert_eq!(frame.output_words(), vec![42]);

    // The domain itself no longer resolves the id.
    let send = request(5, &[]).with_domain(DomainCommand::SendMessage, child);
    assert!(matches!(
        guest_call(&kernel, 0, handle, send),
        Err(SimError::Dispatch(_))
    ));
}

/// Test: A wrapped self-reference stops resolving once the domain is gone
#[test]
fn test_wrapped_self_reference_after_domain_closes() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(ECHO_SERVICE).expect("Failed to connect");
    guest_call(&kernel, 0, handle, control(0, &[])).expect("Promote failed");

    let clone = control(2, &[0; 4]).with_domain(DomainCommand::SendMessage, SELF_OBJECT_ID);
    let response = guest_call(&kernel, 0, handle, clone).expect("Clone failed");
    let wrapped = response.handle_descriptor.unwrap().move_handles[0];

    // While the domain lives, the wrapped self-reference serves the owner's table.
    let response = guest_call(&kernel, 0, wrapped, request(5, &[])).expect("Call failed");
    assert_eq!(
        ResponseFrame::decode(&response.raw_payload).unwrap().output,
        &[1, 0, 0, 0]
    );

    guest_call(&kernel, 0, handle, ipc::Message::close_session()).expect("Close failed");

    let result = guest_call(&kernel, 0, wrapped, request(5, &[]));
    assert!(matches!(result, Err(SimError::Dispatch(_))));
}

/// Test: Objects returned outside a domain arrive as moved handles
#[test]
fn test_returned_object_on_direct_session() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(OPENER_SERVICE).expect("Failed to connect");

    let response = guest_call(&kernel, 0, handle, request(0, &[])).expect("Open failed");
    assert!(response.objects.is_empty());
    let opened = response.handle_descriptor.unwrap().move_handles[0];

    let response = guest_call(&kernel, 0, opened, request(5, &[])).expect("Call failed");
    let frame = ResponseFrame::decode(&response.raw_payload).unwrap();
    assert_eq!(frame.output, &[1, 0, 0, 0]);
}
