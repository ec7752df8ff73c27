//! Sub-frame layout contract tests
//!
//! Request: `[magic "SFCI" u64][command id u64][parameters]`.
//! Response: `[magic "SFCO" u64][result i64][output]`.

use core_types::ResultCode;
use ipc_dispatch::{CommandTable, ServiceRef, TableService};

// ===== Magic Tags =====
pub const REQUEST_MAGIC_BYTES: [u8; 8] = [0x53, 0x46, 0x43, 0x49, 0, 0, 0, 0];
pub const RESPONSE_MAGIC_BYTES: [u8; 8] = [0x53, 0x46, 0x43, 0x4f, 0, 0, 0, 0];

/// Service used by the frame tests
pub fn frame_service() -> ServiceRef {
    TableService::shared(
        "contract",
        CommandTable::new()
            .with_command(5, |ctx| {
                ctx.writer().write_bytes(&[1, 0, 0, 0]);
                ResultCode::SUCCESS
            })
            .with_command(6, |_| ResultCode::from_raw(0x2ee02)),
    )
}
