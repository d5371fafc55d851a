// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The Chunk Type tag and common chunk header (RFC 4960 section 3.2).

use std::borrow::Cow;
use std::fmt;

use crate::error::{SerializationError, ValidationError, ValidationErrorType};
use crate::utils;

/// The number of bytes occupied by the Type, Flags and Length fields of a chunk.
pub const CHUNK_HEADER_SIZE: usize = 4;

/// The largest Value field that can be described by the 16-bit Chunk Length field.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize - CHUNK_HEADER_SIZE;

const HEADER_NAME: &str = "SCTP chunk header";

/// The Chunk Type field, identifying the type of information contained in the Chunk Value.
///
/// Chunk Types not defined here are still valid data and are carried verbatim; only code that
/// dispatches to a concrete chunk needs to treat them differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkType(pub u8);

impl ChunkType {
    /// Payload Data (DATA).
    pub const DATA: ChunkType = ChunkType(0);
    /// Initiation (INIT).
    pub const INIT: ChunkType = ChunkType(1);
    /// Initiation Acknowledgement (INIT ACK).
    pub const INIT_ACK: ChunkType = ChunkType(2);

    #[inline]
    pub const fn new(value: u8) -> Self {
        ChunkType(value)
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The fixed name of the Chunk Type, or `None` if the type is not recognized.
    #[inline]
    pub const fn known_name(self) -> Option<&'static str> {
        match self {
            Self::DATA => Some("Payload data"),
            Self::INIT => Some("Initiation"),
            Self::INIT_ACK => Some("Initiation Acknowledgement"),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_known(self) -> bool {
        self.known_name().is_some()
    }

    /// A human-readable name for the Chunk Type.
    ///
    /// Unrecognized types are rendered as `Unknown ChunkType: <value>`.
    pub fn name(self) -> Cow<'static, str> {
        match self.known_name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("Unknown ChunkType: {}", self.0)),
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown ChunkType: {}", self.0),
        }
    }
}

impl From<u8> for ChunkType {
    #[inline]
    fn from(value: u8) -> Self {
        ChunkType(value)
    }
}

impl From<ChunkType> for u8 {
    #[inline]
    fn from(value: ChunkType) -> Self {
        value.0
    }
}

/// The common header of a single chunk, along with a view of its Value field.
///
/// A header is obtained either by decoding bytes with [`ChunkHeader::unmarshal()`], in which
/// case `value` borrows from the decoded buffer, or by staging a new chunk for encoding with
/// [`ChunkHeader::new()`]. In both cases `length()` is always `4 + value().len()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader<'a> {
    chunk_type: ChunkType,
    flags: u8,
    length: u16,
    value: &'a [u8],
}

impl<'a> ChunkHeader<'a> {
    /// Stages a header that wraps `value` for encoding.
    ///
    /// The Chunk Length is computed from `value`; an error is returned if it would not fit in
    /// 16 bits.
    pub fn new(
        chunk_type: ChunkType,
        flags: u8,
        value: &'a [u8],
    ) -> Result<Self, SerializationError> {
        let length = CHUNK_HEADER_SIZE + value.len();
        let length = u16::try_from(length).map_err(|_| SerializationError::LengthOverflow {
            chunk: HEADER_NAME,
            length,
        })?;

        Ok(ChunkHeader {
            chunk_type,
            flags,
            length,
            value,
        })
    }

    /// Decodes the chunk header at the start of `raw`.
    ///
    /// `raw` is expected to hold this chunk followed by the remainder of the packet. When
    /// fewer than 4 bytes follow the declared chunk they are treated as its padding and must
    /// all be zero; 4 or more trailing bytes are assumed to begin the next chunk and are left
    /// unexamined.
    pub fn unmarshal(raw: &'a [u8]) -> Result<Self, ValidationError> {
        let res = Self::unmarshal_inner(raw);

        #[cfg(feature = "tracing")]
        if let Err(e) = &res {
            tracing::trace!(
                kind = %e.err_type,
                reason = e.reason,
                available = raw.len(),
                "rejected SCTP chunk header"
            );
        }

        res
    }

    fn unmarshal_inner(raw: &'a [u8]) -> Result<Self, ValidationError> {
        let Some(header) = utils::get_array::<CHUNK_HEADER_SIZE>(raw, 0) else {
            return Err(ValidationError {
                chunk: HEADER_NAME,
                err_type: ValidationErrorType::TooShort,
                reason: "insufficient bytes for the 4-byte chunk header",
            });
        };

        let chunk_type = ChunkType(header[0]);
        let flags = header[1];
        let length = u16::from_be_bytes([header[2], header[3]]);
        let unpadded_len = length as usize;

        // Checked before any subtraction so that a short Length can't wrap around
        if unpadded_len < CHUNK_HEADER_SIZE {
            return Err(ValidationError {
                chunk: HEADER_NAME,
                err_type: ValidationErrorType::MalformedLength,
                reason: "Chunk Length field was smaller than the chunk header",
            });
        }

        let Some(value) = raw.get(CHUNK_HEADER_SIZE..unpadded_len) else {
            return Err(ValidationError {
                chunk: HEADER_NAME,
                err_type: ValidationErrorType::TooShort,
                reason: "insufficient bytes for the Chunk Value declared by the Chunk Length field",
            });
        };

        // https://tools.ietf.org/html/rfc4960#section-3.2
        // Chunks are padded with all zero bytes to a multiple of 4 bytes, and the padding
        // MUST NOT be more than 3 bytes. The Chunk Length does not count this padding.
        let trailing = &raw[unpadded_len..];
        if trailing.len() < 4 {
            if let Some(idx) = trailing.iter().rposition(|&b| b != 0) {
                return Err(ValidationError {
                    chunk: HEADER_NAME,
                    err_type: ValidationErrorType::NonZeroPadding {
                        offset: unpadded_len + idx,
                    },
                    reason: "padding following the Chunk Value was non-zero",
                });
            }
        }

        Ok(ChunkHeader {
            chunk_type,
            flags,
            length,
            value,
        })
    }

    #[inline]
    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    /// The Chunk Flags field. Its meaning depends on the Chunk Type.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// The Chunk Length field: the size of the header plus the Value, excluding padding.
    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    #[inline]
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    #[inline]
    pub fn value_length(&self) -> usize {
        self.value.len()
    }

    /// The number of bytes the chunk occupies within a packet once padded to 4 bytes.
    #[inline]
    pub fn padded_len(&self) -> usize {
        utils::padded_length::<4>(self.length as usize)
    }

    /// Appends the header and Value to `bytes`. No padding is written.
    pub fn marshal_to(&self, bytes: &mut Vec<u8>) {
        bytes.reserve(CHUNK_HEADER_SIZE + self.value.len());
        bytes.push(self.chunk_type.0);
        bytes.push(self.flags);
        bytes.extend(self.length.to_be_bytes());
        bytes.extend_from_slice(self.value);
    }

    #[inline]
    pub fn marshal(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.marshal_to(&mut bytes);
        bytes
    }
}
