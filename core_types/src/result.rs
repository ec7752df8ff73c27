//! Result codes returned by service handlers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed 64-bit result code written into every response frame
///
/// Result codes are payload data from the dispatcher's point of view: a
/// handler's failure code is passed through to the guest untouched and is
/// never turned into a dispatch error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultCode(i64);

impl ResultCode {
    /// The success code (0)
    pub const SUCCESS: ResultCode = ResultCode(0);

    /// Creates a result code from a raw value
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw value
    pub const fn as_raw(&self) -> i64 {
        self.0
    }

    /// Returns true if this is the success code
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<i64> for ResultCode {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result({:#x})", self.0)
    }
}
