//! Command tables and dispatchable objects

use crate::CallContext;
use core_types::ResultCode;
use ipc::CommandId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handler bound to one command id
///
/// A handler reads its parameters from the call context, writes its output
/// parameters back into it, and returns the result code for the guest.
pub type CommandHandler = Box<dyn Fn(&mut CallContext<'_>) -> ResultCode + Send + Sync>;

/// Mapping from command id to handler, owned by a service object
///
/// The dispatcher only ever looks commands up; tables are built once when the
/// service is constructed.
#[derive(Default)]
pub struct CommandTable {
    handlers: HashMap<CommandId, CommandHandler>,
}

impl CommandTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Adds a handler, builder style
    pub fn with_command<F>(mut self, command_id: CommandId, handler: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> ResultCode + Send + Sync + 'static,
    {
        self.insert(command_id, handler);
        self
    }

    /// Adds or replaces a handler
    pub fn insert<F>(&mut self, command_id: CommandId, handler: F)
    where
        F: Fn(&mut CallContext<'_>) -> ResultCode + Send + Sync + 'static,
    {
        self.handlers.insert(command_id, Box::new(handler));
    }

    /// Looks up the handler for `command_id`
    pub fn lookup(&self, command_id: CommandId) -> Option<&CommandHandler> {
        self.handlers.get(&command_id)
    }

    pub fn contains(&self, command_id: CommandId) -> bool {
        self.handlers.contains_key(&command_id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the implemented command ids in ascending order
    pub fn command_ids(&self) -> Vec<CommandId> {
        let mut ids: Vec<CommandId> = self.handlers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTable")
            .field("commands", &self.command_ids())
            .finish()
    }
}

/// Anything the dispatcher can route a command to
pub trait HasCommandTable: Send + Sync {
    /// Service name used in diagnostics
    fn name(&self) -> &str;

    /// The object's command table
    fn command_table(&self) -> &CommandTable;
}

/// Shared reference to a dispatchable object
pub type ServiceRef = Arc<dyn HasCommandTable>;

/// A service defined entirely by its name and command table
///
/// Handlers that need state capture it in their closures.
#[derive(Debug)]
pub struct TableService {
    name: String,
    commands: CommandTable,
}

impl TableService {
    /// Creates a service
    pub fn new(name: impl Into<String>, commands: CommandTable) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// Creates a shared service reference
    pub fn shared(name: impl Into<String>, commands: CommandTable) -> ServiceRef {
        Arc::new(Self::new(name, commands))
    }
}

impl HasCommandTable for TableService {
    fn name(&self) -> &str {
        &self.name
    }

    fn command_table(&self) -> &CommandTable {
        &self.commands
    }
}
