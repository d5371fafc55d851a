// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::{SerializationError, ValidationError};
use crate::header::{ChunkHeader, ChunkType};
use crate::traits::{self, Chunk};

const CHUNK_NAME: &str = "SCTP <unknown> chunk";

/// A chunk whose Chunk Type has no dedicated decoder.
///
/// The Chunk Type, Flags and Value are carried verbatim, so the chunk re-encodes to the same
/// bytes it was decoded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownChunk {
    chunk_type: ChunkType,
    flags: u8,
    value: Vec<u8>,
}

impl UnknownChunk {
    #[inline]
    pub fn new(chunk_type: ChunkType, flags: u8, value: Vec<u8>) -> Self {
        UnknownChunk {
            chunk_type,
            flags,
            value,
        }
    }

    #[inline]
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut Vec<u8> {
        &mut self.value
    }
}

impl From<ChunkHeader<'_>> for UnknownChunk {
    #[inline]
    fn from(header: ChunkHeader<'_>) -> Self {
        UnknownChunk {
            chunk_type: header.chunk_type(),
            flags: header.flags(),
            value: header.value().to_vec(),
        }
    }
}

impl Chunk for UnknownChunk {
    #[inline]
    fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    #[inline]
    fn flags(&self) -> u8 {
        self.flags
    }

    /// Decodes any chunk, whatever its Chunk Type.
    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError> {
        ChunkHeader::unmarshal(raw)
            .map(Self::from)
            .map_err(|e| e.in_chunk(CHUNK_NAME))
    }

    #[inline]
    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        traits::marshal_value(bytes, self.chunk_type, self.flags, &self.value, CHUNK_NAME)
    }

    #[inline]
    fn value_length(&self) -> usize {
        self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorType;

    #[test]
    fn unknown_chunk_is_carried_verbatim() {
        let raw = [0xC8, 0x81, 0x00, 0x07, 0x01, 0x02, 0x03, 0x00];
        let chunk = UnknownChunk::unmarshal(&raw).unwrap();
        assert_eq!(chunk.chunk_type(), ChunkType(200));
        assert_eq!(chunk.flags(), 0x81);
        assert_eq!(chunk.value(), &[1, 2, 3]);
        assert_eq!(chunk.value_length(), 3);
        assert_eq!(chunk.marshal().unwrap(), &raw[..7]);
    }

    #[test]
    fn header_errors_are_attributed() {
        let err = UnknownChunk::unmarshal(&[0xC8, 0x00, 0x00, 0x03]).unwrap_err();
        assert_eq!(err.chunk, CHUNK_NAME);
        assert_eq!(err.err_type, ValidationErrorType::MalformedLength);
    }
}
