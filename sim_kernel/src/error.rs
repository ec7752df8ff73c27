//! Simulated kernel error types

use ipc_dispatch::DispatchError;
use kernel_api::KernelError;
use services_registry::RegistryError;
use thiserror::Error;

/// Errors returned by [`crate::SimulatedKernel`] operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl SimError {
    /// Returns true when the guest thread that issued the call should be
    /// terminated
    pub fn is_fatal_to_thread(&self) -> bool {
        match self {
            SimError::Dispatch(error) => error.is_fatal_to_thread(),
            SimError::Registry(_) | SimError::Kernel(_) => false,
        }
    }
}
