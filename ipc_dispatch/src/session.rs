//! Session model
//!
//! A session is the host-side state bound to one guest channel. It is always
//! in exactly one of three shapes, and dispatch matches on the shape rather
//! than inspecting the target object.

use crate::command::ServiceRef;
use crate::domain::{Domain, DomainObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Host-side state of a guest channel
#[derive(Clone)]
pub enum Session {
    /// Commands go straight to one service's table
    Direct(ServiceRef),
    /// Commands are routed to objects inside a domain
    Domain(Arc<Domain>),
    /// A handle aliasing one object that lives inside another session's domain
    Wrapped(DomainObject),
}

/// Shared session value; every handle aliasing the session holds one
pub type SessionRef = Arc<Session>;

impl Session {
    /// Creates a direct session on `service`
    pub fn direct(service: ServiceRef) -> SessionRef {
        Arc::new(Session::Direct(service))
    }

    /// Creates a domain session
    pub fn domain(domain: Arc<Domain>) -> SessionRef {
        Arc::new(Session::Domain(domain))
    }

    /// Creates a session aliasing a domain object
    pub fn wrapped(object: DomainObject) -> SessionRef {
        Arc::new(Session::Wrapped(object))
    }

    /// Returns the shape tag
    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Direct(_) => SessionKind::Direct,
            Session::Domain(_) => SessionKind::Domain,
            Session::Wrapped(_) => SessionKind::Wrapped,
        }
    }

    /// Returns the domain for domain sessions
    pub fn as_domain(&self) -> Option<&Arc<Domain>> {
        match self {
            Session::Domain(domain) => Some(domain),
            Session::Direct(_) | Session::Wrapped(_) => None,
        }
    }

    /// Name of the service behind the session, for diagnostics
    pub fn service_name(&self) -> String {
        match self {
            Session::Direct(service) => service.name().to_string(),
            Session::Domain(domain) => domain.owner().name().to_string(),
            Session::Wrapped(DomainObject::Service(service)) => service.name().to_string(),
            Session::Wrapped(DomainObject::Domain(weak)) => weak
                .upgrade()
                .map(|domain| domain.owner().name().to_string())
                .unwrap_or_else(|| "<closed domain>".to_string()),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session::{:?}({})", self.kind(), self.service_name())
    }
}

/// Shape of a session, without its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    Direct,
    Domain,
    Wrapped,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Direct => write!(f, "direct"),
            SessionKind::Domain => write!(f, "domain"),
            SessionKind::Wrapped => write!(f, "wrapped"),
        }
    }
}

/// Builds the domain a session turns into when promoted
///
/// Direct sessions, and wrapped sessions aliasing a service, promote around
/// their service. Sessions that already address a domain cannot be promoted
/// and yield `None`. The caller rebinds the guest handle to the new domain.
pub fn promote_to_domain(session: &Session) -> Option<Arc<Domain>> {
    match session {
        Session::Direct(service) | Session::Wrapped(DomainObject::Service(service)) => {
            Some(Domain::promote(Arc::clone(service)))
        }
        Session::Domain(_) | Session::Wrapped(DomainObject::Domain(_)) => None,
    }
}
