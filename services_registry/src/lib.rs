//! # Service Registry
//!
//! This crate maps guest-visible service names to host service factories.
//!
//! ## Philosophy
//!
//! A guest connects to a service by name and gets a fresh service instance
//! behind a Direct session. The registry stores how to build each service,
//! not live instances, so every connection owns its own object.

use ipc_dispatch::ServiceRef;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Tracing target for registry events.
const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Error types for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Service name already registered
    #[error("service '{0}' is already registered")]
    NameAlreadyRegistered(String),
    /// Service name not found
    #[error("service '{0}' is not registered")]
    NameNotFound(String),
}

/// Builds a new instance of a service
pub type ServiceFactory = Arc<dyn Fn() -> ServiceRef + Send + Sync>;

/// Service registry
///
/// This maintains a mapping from service names to factories.
#[derive(Default)]
pub struct ServiceRegistry {
    factories: HashMap<String, ServiceFactory>,
}

impl ServiceRegistry {
    /// Creates a new service registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a service factory under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> ServiceRef + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::NameAlreadyRegistered(name));
        }
        debug!(target: REGISTRY_TARGET, service = %name, "service registered");
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Builds a new instance of the service registered under `name`
    pub fn open(&self, name: &str) -> Result<ServiceRef, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::NameNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// Returns true if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Unregisters a service
    pub fn unregister(&mut self, name: &str) -> Result<(), RegistryError> {
        self.factories
            .remove(name)
            .ok_or_else(|| RegistryError::NameNotFound(name.to_string()))?;
        debug!(target: REGISTRY_TARGET, service = name, "service unregistered");
        Ok(())
    }

    /// Returns the registered names in ascending order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered services
    pub fn count(&self) -> usize {
        self.factories.len()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}
