// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Traits implemented by every concrete chunk.

use crate::error::{SerializationError, ValidationError, ValidationErrorType};
use crate::header::{ChunkHeader, ChunkType, CHUNK_HEADER_SIZE};
use crate::utils;

/// A single SCTP chunk that can be decoded from and encoded into its wire representation.
///
/// Implementors decode the common header through [`ChunkHeader::unmarshal()`] and interpret
/// the Value field according to their own layout. Encoding goes the other way: the chunk
/// serializes its fields into a Value and wraps it in a freshly computed header.
pub trait Chunk: Sized {
    /// The Chunk Type this chunk is encoded with.
    fn chunk_type(&self) -> ChunkType;

    /// The raw Chunk Flags field.
    fn flags(&self) -> u8;

    /// Decodes a chunk from the start of `raw`.
    ///
    /// As with [`ChunkHeader::unmarshal()`], `raw` may extend past the end of the chunk into
    /// its padding or the chunks that follow it.
    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError>;

    /// Appends the chunk's header and Value to `bytes`. Trailing padding is not written.
    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError>;

    /// Serializes the chunk into a new byte vector.
    #[inline]
    fn marshal(&self) -> Result<Vec<u8>, SerializationError> {
        let mut bytes = Vec::with_capacity(self.len());
        self.marshal_to(&mut bytes)?;
        Ok(bytes)
    }

    /// The number of bytes currently held in the chunk's Value field.
    fn value_length(&self) -> usize;

    /// The unpadded length of the chunk (i.e. the value its Chunk Length field would hold).
    #[inline]
    fn len(&self) -> usize {
        CHUNK_HEADER_SIZE + self.value_length()
    }

    /// The length of the chunk once padded to a 4-byte boundary.
    #[inline]
    fn padded_len(&self) -> usize {
        utils::padded_length::<4>(self.len())
    }
}

/// Decodes the header at the start of `raw` and checks that it carries `expected` as its Chunk
/// Type. Errors are attributed to `chunk`.
pub(crate) fn unmarshal_typed<'a>(
    raw: &'a [u8],
    expected: ChunkType,
    chunk: &'static str,
) -> Result<ChunkHeader<'a>, ValidationError> {
    let header = ChunkHeader::unmarshal(raw).map_err(|e| e.in_chunk(chunk))?;
    if header.chunk_type() != expected {
        return Err(ValidationError {
            chunk,
            err_type: ValidationErrorType::UnexpectedType(header.chunk_type()),
            reason: "Chunk Type field did not match the chunk being decoded",
        });
    }

    Ok(header)
}

/// Wraps an encoded Value in a chunk header and appends both to `bytes`.
pub(crate) fn marshal_value(
    bytes: &mut Vec<u8>,
    chunk_type: ChunkType,
    flags: u8,
    value: &[u8],
    chunk: &'static str,
) -> Result<(), SerializationError> {
    let header = ChunkHeader::new(chunk_type, flags, value).map_err(|_| {
        SerializationError::LengthOverflow {
            chunk,
            length: CHUNK_HEADER_SIZE + value.len(),
        }
    })?;
    header.marshal_to(bytes);
    Ok(())
}
