//! Command sub-frame codec
//!
//! The sub-frame rides inside a message's raw payload:
//!
//! ```text
//! request:  [magic "SFCI" u64][command id u64, low 32 bits used][parameters]
//! response: [magic "SFCO" u64][result code i64][output]
//! ```
//!
//! Decoding does not check the magic tag. Callers that want to reject
//! mismatched tags use [`RequestFrame::check_magic`].

use crate::buffer::{ByteReader, ByteWriter};
use crate::FrameError;
use core_types::ResultCode;

/// Command identifier selecting an operation within an object
pub type CommandId = u32;

/// Magic tag of inbound frames ("SFCI" in the low 4 bytes)
pub const REQUEST_MAGIC: u64 = u32::from_le_bytes(*b"SFCI") as u64;

/// Magic tag of outbound frames ("SFCO" in the low 4 bytes)
pub const RESPONSE_MAGIC: u64 = u32::from_le_bytes(*b"SFCO") as u64;

/// Size of the fixed header shared by both directions
pub const HEADER_SIZE: usize = 16;

/// Decoded view of an inbound sub-frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame<'a> {
    /// Magic tag exactly as read from the wire
    pub magic: u64,
    /// Command identifier (low half of the 8-byte field)
    pub command_id: CommandId,
    /// Command-specific parameters following the header
    pub payload: &'a [u8],
}

impl<'a> RequestFrame<'a> {
    /// Decodes the fixed header and borrows the remaining parameters
    pub fn decode(bytes: &'a [u8]) -> Result<Self, FrameError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.read_u64()?;
        // The wire field is 8 bytes wide; only the low 32 bits name the command.
        let command_id = reader.read_u64()? as u32;
        Ok(Self {
            magic,
            command_id,
            payload: reader.remaining_bytes(),
        })
    }

    /// Returns true if the frame carries the request tag
    pub fn has_request_magic(&self) -> bool {
        self.magic == REQUEST_MAGIC
    }

    /// Fails with [`FrameError::MagicMismatch`] unless the request tag is present
    pub fn check_magic(&self) -> Result<(), FrameError> {
        if self.has_request_magic() {
            Ok(())
        } else {
            Err(FrameError::MagicMismatch {
                expected: REQUEST_MAGIC,
                actual: self.magic,
            })
        }
    }

    /// Returns a reader positioned at the first parameter byte
    pub fn parameters(&self) -> ByteReader<'a> {
        ByteReader::new(self.payload)
    }
}

/// Decoded view of an outbound sub-frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame<'a> {
    pub magic: u64,
    pub result: ResultCode,
    pub output: &'a [u8],
}

impl<'a> ResponseFrame<'a> {
    /// Decodes a response produced by [`encode_response`]
    pub fn decode(bytes: &'a [u8]) -> Result<Self, FrameError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader.read_u64()?;
        let result = ResultCode::from_raw(reader.read_i64()?);
        Ok(Self {
            magic,
            result,
            output: reader.remaining_bytes(),
        })
    }

    /// Interprets the output as consecutive little-endian 32-bit words
    ///
    /// Trailing bytes that do not fill a whole word are ignored.
    pub fn output_words(&self) -> Vec<u32> {
        self.output
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

/// Encodes a request sub-frame (guest side)
pub fn encode_request(command_id: CommandId, parameters: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(HEADER_SIZE + parameters.len());
    writer.write_u64(REQUEST_MAGIC);
    writer.write_u64(u64::from(command_id));
    writer.write_bytes(parameters);
    writer.into_bytes()
}

/// Decodes a response sub-frame (guest side)
pub fn decode_response(bytes: &[u8]) -> Result<ResponseFrame<'_>, FrameError> {
    ResponseFrame::decode(bytes)
}

/// Encodes a response sub-frame carrying raw handler output
pub fn encode_response(result: ResultCode, output: &[u8]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(HEADER_SIZE + output.len());
    writer.write_u64(RESPONSE_MAGIC);
    writer.write_i64(result.as_raw());
    writer.write_bytes(output);
    writer.into_bytes()
}

/// Encodes a response sub-frame whose output is a list of 32-bit words
pub fn encode_response_words(result: ResultCode, words: &[u32]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(HEADER_SIZE + words.len() * 4);
    writer.write_u64(RESPONSE_MAGIC);
    writer.write_i64(result.as_raw());
    for word in words {
        writer.write_u32(*word);
    }
    writer.into_bytes()
}
