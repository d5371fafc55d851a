// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types returned when decoding or encoding chunks.

use thiserror::Error;

use crate::header::ChunkType;

/// An error indicating that a sequence of bytes could not be decoded into a chunk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("{chunk}: {reason} ({err_type})")]
pub struct ValidationError {
    /// The structure that failed to decode (e.g. "SCTP DATA chunk").
    pub chunk: &'static str,
    pub err_type: ValidationErrorType,
    pub reason: &'static str,
}

impl ValidationError {
    /// Reattributes the error to the given chunk, keeping its kind and reason.
    #[inline]
    pub fn in_chunk(self, chunk: &'static str) -> Self {
        ValidationError { chunk, ..self }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationErrorType {
    /// The buffer holds fewer bytes than the header or its declared length requires.
    #[error("too short")]
    TooShort,
    /// A length field is smaller than the fixed portion it is required to cover.
    #[error("malformed length")]
    MalformedLength,
    /// A byte that must be padding was non-zero.
    #[error("non-zero padding at offset {offset}")]
    NonZeroPadding { offset: usize },
    /// A field held a value that the chunk's definition forbids.
    #[error("invalid value")]
    InvalidValue,
    /// The chunk carried a Chunk Type other than the one being decoded.
    #[error("unexpected chunk type {0}")]
    UnexpectedType(ChunkType),
}

/// An error indicating that a chunk could not be converted into its byte representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("{chunk} length of {length} bytes does not fit in the 16-bit Chunk Length field")]
    LengthOverflow { chunk: &'static str, length: usize },
    #[error("parameter {param_type} length of {length} bytes does not fit in its 16-bit Length field")]
    ParamLengthOverflow { param_type: u16, length: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_offset() {
        let err = ValidationError {
            chunk: "SCTP chunk header",
            err_type: ValidationErrorType::NonZeroPadding { offset: 7 },
            reason: "padding following the chunk Value was non-zero",
        };

        let msg = err.to_string();
        assert!(msg.starts_with("SCTP chunk header: padding"));
        assert!(msg.contains("offset 7"));
    }

    #[test]
    fn in_chunk_keeps_kind() {
        let err = ValidationError {
            chunk: "SCTP chunk header",
            err_type: ValidationErrorType::TooShort,
            reason: "insufficient bytes",
        }
        .in_chunk("SCTP INIT chunk");

        assert_eq!(err.chunk, "SCTP INIT chunk");
        assert_eq!(err.err_type, ValidationErrorType::TooShort);
        assert_eq!(err.reason, "insufficient bytes");
    }

    #[test]
    fn unexpected_type_names_type() {
        let msg = ValidationErrorType::UnexpectedType(ChunkType::INIT).to_string();
        assert_eq!(msg, "unexpected chunk type Initiation");
    }
}
