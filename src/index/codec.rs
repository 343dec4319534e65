//! Binary format of segment files.
//!
//! ```text
//! magic     4 bytes   "SYMX"
//! version   u16 LE
//! length    u64 LE    payload length in bytes
//! checksum  u32 LE    CRC32 of the payload
//! payload   bincode-encoded IndexSegment
//! ```
//!
//! The payload only contains ordered maps, so equal segments always encode
//! to identical bytes.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SymdexError};
use crate::index::segment::IndexSegment;

pub const SEGMENT_MAGIC: &[u8; 4] = b"SYMX";
pub const SEGMENT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 8 + 4;

/// Encode a segment into its file representation.
pub fn encode(segment: &IndexSegment) -> Result<Vec<u8>> {
    let payload = bincode::serialize(segment)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(SEGMENT_MAGIC);
    bytes.write_u16::<LittleEndian>(SEGMENT_VERSION)?;
    bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
    bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a segment file, verifying magic, version and checksum.
pub fn decode(bytes: &[u8]) -> Result<IndexSegment> {
    if bytes.len() < HEADER_LEN {
        return Err(SymdexError::serialization(format!(
            "Segment file too short: {} bytes",
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != SEGMENT_MAGIC {
        return Err(SymdexError::serialization("Invalid segment file format"));
    }

    let version = cursor.read_u16::<LittleEndian>()?;
    if version != SEGMENT_VERSION {
        return Err(SymdexError::serialization(format!(
            "Unsupported segment version: {version}"
        )));
    }

    let length = cursor.read_u64::<LittleEndian>()? as usize;
    let checksum = cursor.read_u32::<LittleEndian>()?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() != length {
        return Err(SymdexError::serialization(format!(
            "Segment payload length mismatch: expected {length}, found {}",
            payload.len()
        )));
    }
    if crc32fast::hash(payload) != checksum {
        return Err(SymdexError::serialization("Segment checksum mismatch"));
    }

    Ok(bincode::deserialize(payload)?)
}
