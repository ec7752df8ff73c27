//! # IPC Dispatch
//!
//! This crate routes guest IPC calls to host-side service handlers.
//!
//! ## Philosophy
//!
//! - **Sessions are a closed set**: a guest handle is bound to a Direct,
//!   Domain or Wrapped [`Session`], and dispatch matches on that shape
//! - **Objects expose tables**: anything callable implements
//!   [`HasCommandTable`]; the dispatcher only looks commands up
//! - **Failures are values**: unresolved commands and bad frames come back
//!   as [`DispatchError`]s; the caller decides what happens to the guest
//!   thread
//!
//! ## Example
//!
//! ```
//! use core_types::ResultCode;
//! use ipc_dispatch::{CommandTable, Session, TableService};
//!
//! let service = TableService::shared(
//!     "time:u",
//!     CommandTable::new().with_command(0, |ctx| {
//!         ctx.writer().write_u64(1_700_000_000);
//!         ResultCode::SUCCESS
//!     }),
//! );
//! let session = Session::direct(service);
//! assert_eq!(session.service_name(), "time:u");
//! ```

pub mod command;
pub mod config;
pub mod context;
pub mod control;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod session;

pub use command::{CommandHandler, CommandTable, HasCommandTable, ServiceRef, TableService};
pub use config::{ConfigError, DispatchConfig, MagicPolicy, DEFAULT_POINTER_BUFFER_SIZE};
pub use context::CallContext;
pub use control::{handle_control, ControlCommand, ControlOutcome, SessionMutation};
pub use dispatcher::Dispatcher;
pub use domain::{Domain, DomainObject, ObjectIdsExhausted, SELF_OBJECT_ID};
pub use error::{DispatchError, UnimplementedTarget};
pub use session::{promote_to_domain, Session, SessionKind, SessionRef};
