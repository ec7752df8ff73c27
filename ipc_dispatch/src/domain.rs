//! Domain object registry
//!
//! A domain multiplexes many objects over one session. Objects are addressed
//! by [`ObjectId`]s handed out in strictly increasing order starting at 1.
//! Deleted ids leave an empty slot behind and are never handed out again.
//!
//! The registry is shared by every handle aliasing the session and by every
//! guest thread calling through them, so all operations go through a single
//! mutex per domain. Lookups return a counted reference that stays valid for
//! the caller's use even if the entry is deleted concurrently.

use crate::command::ServiceRef;
use core_types::ObjectId;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use thiserror::Error;
use tracing::trace;

/// Tracing target for registry operations.
const DOMAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::domain");

/// Id of the self-reference registered when a session is promoted
pub const SELF_OBJECT_ID: ObjectId = ObjectId::from_raw(1);

/// Every object id a domain can hand out has been used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("domain object ids exhausted")]
pub struct ObjectIdsExhausted;

/// An entry in a domain's registry
#[derive(Clone)]
pub enum DomainObject {
    /// A service object registered with the domain
    Service(ServiceRef),
    /// A domain, as registered for the self-reference created on promotion
    ///
    /// Held weakly: the domain is kept alive by its session handles, not by
    /// its own registry.
    Domain(Weak<Domain>),
}

impl DomainObject {
    /// Returns true for domain entries
    pub fn is_domain(&self) -> bool {
        matches!(self, DomainObject::Domain(_))
    }

    /// Returns the service for service entries
    pub fn as_service(&self) -> Option<&ServiceRef> {
        match self {
            DomainObject::Service(service) => Some(service),
            DomainObject::Domain(_) => None,
        }
    }
}

impl fmt::Debug for DomainObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainObject::Service(service) => write!(f, "Service({})", service.name()),
            DomainObject::Domain(_) => write!(f, "Domain"),
        }
    }
}

/// Dense id -> slot arena; slot `n` holds object id `n + 1`
///
/// Deleted entries leave their slot empty for the life of the domain, so the
/// arena only grows.
#[derive(Default)]
struct ObjectRegistry {
    slots: Vec<Option<DomainObject>>,
}

impl ObjectRegistry {
    fn add(&mut self, object: DomainObject) -> Result<ObjectId, ObjectIdsExhausted> {
        let id = Self::id_for_slot(self.slots.len()).ok_or(ObjectIdsExhausted)?;
        self.slots.push(Some(object));
        Ok(id)
    }

    fn id_for_slot(index: usize) -> Option<ObjectId> {
        let raw = u32::try_from(index).ok()?.checked_add(1)?;
        Some(ObjectId::from_raw(raw))
    }

    fn slot_index(id: ObjectId) -> Option<usize> {
        (id.as_raw() as usize).checked_sub(1)
    }

    fn get(&self, id: ObjectId) -> Option<DomainObject> {
        let index = Self::slot_index(id)?;
        self.slots.get(index).cloned().flatten()
    }

    fn delete(&mut self, id: ObjectId) -> Option<DomainObject> {
        let index = Self::slot_index(id)?;
        self.slots.get_mut(index).and_then(Option::take)
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A session in domain mode
pub struct Domain {
    /// Service the domain was promoted from; its table serves requests that
    /// address the domain itself
    owner: ServiceRef,
    registry: Mutex<ObjectRegistry>,
}

impl Domain {
    /// Creates an empty domain owned by `owner`
    pub fn new(owner: ServiceRef) -> Self {
        Self {
            owner,
            registry: Mutex::new(ObjectRegistry::default()),
        }
    }

    /// Creates a domain from a direct session's service
    ///
    /// The domain registers a reference to itself as its first object, so
    /// [`SELF_OBJECT_ID`] addresses the promoted service.
    pub fn promote(owner: ServiceRef) -> Arc<Domain> {
        Arc::new_cyclic(|this| Domain {
            owner,
            // Slot 0 is SELF_OBJECT_ID.
            registry: Mutex::new(ObjectRegistry {
                slots: vec![Some(DomainObject::Domain(this.clone()))],
            }),
        })
    }

    /// The service this domain was promoted from
    pub fn owner(&self) -> &ServiceRef {
        &self.owner
    }

    /// Registers `object` and returns its new id
    pub fn add(&self, object: DomainObject) -> Result<ObjectId, ObjectIdsExhausted> {
        let id = self.lock().add(object)?;
        trace!(target: DOMAIN_TARGET, object_id = id.as_raw(), "domain object added");
        Ok(id)
    }

    /// Registers a service object and returns its new id
    pub fn add_service(&self, service: ServiceRef) -> Result<ObjectId, ObjectIdsExhausted> {
        self.add(DomainObject::Service(service))
    }

    /// Resolves `id`; none for id 0, unassigned ids and deleted ids
    pub fn get(&self, id: ObjectId) -> Option<DomainObject> {
        self.lock().get(id)
    }

    /// Removes `id` if present and returns the removed entry
    ///
    /// Deleting an absent id is a no-op.
    pub fn delete(&self, id: ObjectId) -> Option<DomainObject> {
        let removed = self.lock().delete(id);
        trace!(
            target: DOMAIN_TARGET,
            object_id = id.as_raw(),
            existed = removed.is_some(),
            "domain object deleted"
        );
        // The entry is dropped by the caller, outside the registry lock.
        removed
    }

    /// Returns the number of live objects
    pub fn len(&self) -> usize {
        self.lock().live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, ObjectRegistry> {
        // Every registry operation completes without panicking, so a poisoned
        // lock still guards consistent state.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("owner", &self.owner.name())
            .field("objects", &self.len())
            .finish()
    }
}
