//! Domain Concurrency Tests
//!
//! Validates that a domain's object registry stays consistent when several
//! guest threads add, look up and delete objects at the same time.

use core_types::ObjectId;
use ipc::{DomainCommand, ResponseFrame};
use ipc_dispatch::{Domain, ServiceRef, SessionKind, SELF_OBJECT_ID};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tests_resilience::{
    control, counter_service, echo_service, guest_call, request, test_bootstrap,
    COUNTER_SERVICE,
};

/// Test: Concurrent adds never hand out the same id twice
#[test]
fn test_concurrent_add_assigns_distinct_ids() {
    let domain = Domain::new(echo_service());
    let child: ServiceRef = echo_service();
    let (domain_ref, child_ref) = (&domain, &child);

    let ids: Vec<ObjectId> = thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(move || {
                    (0..1000)
                        .map(|_| domain_ref.add_service(Arc::clone(child_ref)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().expect("Worker panicked"))
            .collect()
    });

    let distinct: HashSet<u32> = ids.iter().map(ObjectId::as_raw).collect();
    assert_eq!(ids.len(), 2000);
    assert_eq!(distinct.len(), 2000);
    assert_eq!(domain.len(), 2000);
    assert_eq!(distinct.iter().min(), Some(&1));
    assert_eq!(distinct.iter().max(), Some(&2000));
}

/// Test: Deleting while other threads add and look up loses nothing
#[test]
fn test_concurrent_delete_and_lookup() {
    let domain = Domain::new(echo_service());
    let seeded: Vec<ObjectId> = (0..500)
        .map(|_| domain.add_service(echo_service()).unwrap())
        .collect();

    let added: Vec<ObjectId> = thread::scope(|scope| {
        scope.spawn(|| {
            for id in seeded.iter().step_by(2) {
                domain.delete(*id);
            }
        });
        scope.spawn(|| {
            for id in &seeded {
                // Either still present or already deleted; never a panic.
                let _ = domain.get(*id);
            }
        });
        let adder = scope.spawn(|| {
            (0..500)
                .map(|_| domain.add_service(echo_service()).unwrap())
                .collect::<Vec<_>>()
        });
        adder.join().expect("Adder panicked")
    });

    for (index, id) in seeded.iter().enumerate() {
        assert_eq!(domain.get(*id).is_some(), index % 2 == 1);
    }
    for id in &added {
        assert!(id.as_raw() > 500);
        assert!(domain.get(*id).is_some());
    }
    assert_eq!(domain.len(), 250 + 500);
}

/// Test: Guest threads calling through aliased handles share one session
#[test]
fn test_concurrent_calls_through_aliased_handles() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(COUNTER_SERVICE).expect("Failed to connect");

    let response = guest_call(&kernel, 0, handle, control(2, &[0; 4])).expect("Clone failed");
    let alias = response.handle_descriptor.expect("No handle moved").move_handles[0];

    let kernel_ref = &kernel;
    let values: Vec<u32> = thread::scope(|scope| {
        let workers: Vec<_> = [(1, handle), (2, alias)]
            .into_iter()
            .map(|(slot, target)| {
                scope.spawn(move || {
                    (0..200)
                        .map(|_| {
                            let response = guest_call(kernel_ref, slot, target, request(0, &[]))
                                .expect("Call failed");
                            let frame = ResponseFrame::decode(&response.raw_payload)
                                .expect("Bad response");
                            frame.output_words()[0]
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|worker| worker.join().expect("Worker panicked"))
            .collect()
    });

    let distinct: HashSet<u32> = values.into_iter().collect();
    assert_eq!(distinct.len(), 400);
    assert_eq!(distinct.iter().max(), Some(&400));
}

/// Test: Concurrent SendMessage and DeleteObject on one domain session
#[test]
fn test_send_races_with_delete() {
    let kernel = test_bootstrap();
    let handle = kernel.connect(COUNTER_SERVICE).expect("Failed to connect");
    guest_call(&kernel, 0, handle, control(0, &[])).expect("Promote failed");

    let session = kernel.session(handle).expect("Session missing");
    assert_eq!(session.kind(), SessionKind::Domain);
    let domain = session.as_domain().expect("Not a domain").clone();
    let children: Vec<ObjectId> = (0..100)
        .map(|_| domain.add_service(counter_service()).unwrap())
        .collect();

    let (kernel, children) = (&kernel, &children);
    thread::scope(|scope| {
        scope.spawn(move || {
            for id in children {
                let message = request(0, &[]).with_domain(DomainCommand::DeleteObject, *id);
                let response = guest_call(kernel, 1, handle, message).expect("Delete failed");
                let frame = ResponseFrame::decode(&response.raw_payload).expect("Bad response");
                assert!(frame.result.is_success());
            }
        });
        scope.spawn(move || {
            for id in children.iter().rev() {
                let message = request(0, &[]).with_domain(DomainCommand::SendMessage, *id);
                // Deleted targets fail as unimplemented; live ones succeed.
                if let Err(error) = guest_call(kernel, 2, handle, message) {
                    assert!(error.is_fatal_to_thread());
                }
            }
        });
    });

    assert_eq!(domain.len(), 1);
    assert!(domain.get(SELF_OBJECT_ID).is_some());
}
