//! Little-endian cursor types over IPC payload bytes

use crate::FrameError;

/// Read cursor over a borrowed payload
///
/// Every read is bounds-checked; reading past the end yields
/// [`FrameError::Truncated`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Returns the current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Returns the unread bytes without consuming them
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Consumes `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FrameError> {
        if len > self.remaining() {
            return Err(FrameError::Truncated {
                needed: self.position + len,
                available: self.data.len(),
            });
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Skips `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<(), FrameError> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u32(&mut self) -> Result<u32, FrameError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, FrameError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, FrameError> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, FrameError> {
        self.read_array().map(i64::from_le_bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FrameError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }
}

/// Growable little-endian output buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty writer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Returns the number of bytes written so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the written bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the writer and returns the written bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
