//! Configuration document contract tests

// ===== Field Names =====
pub const FIELD_POINTER_BUFFER_SIZE: &str = "pointer_buffer_size";
pub const FIELD_MAGIC_POLICY: &str = "magic_policy";
