//! Control command contract tests

use ipc::CommandId;

// ===== Control Command Identifiers =====
pub const CONTROL_CONVERT_TO_DOMAIN: CommandId = 0;
pub const CONTROL_CLONE_OBJECT: CommandId = 2;
pub const CONTROL_QUERY_POINTER_BUFFER_SIZE: CommandId = 3;
pub const CONTROL_CLONE_OBJECT_EX: CommandId = 4;
