// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Concrete chunk types, dispatch by Chunk Type, and iteration over the chunks of a packet.

mod data;
mod init;
mod unknown;

pub use data::{DataChunk, DataChunkFlags};
pub use init::{InitAckChunk, InitChunk, InitFields, InitParam, PARAM_STATE_COOKIE};
pub use unknown::UnknownChunk;

use crate::error::{SerializationError, ValidationError, ValidationErrorType};
use crate::header::{ChunkHeader, ChunkType};
use crate::traits::Chunk;

/// Any chunk, decoded into the variant matching its Chunk Type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnyChunk {
    Data(DataChunk),
    Init(InitChunk),
    InitAck(InitAckChunk),
    Unknown(UnknownChunk),
}

impl AnyChunk {
    /// Decodes the Value of `header` according to its Chunk Type.
    pub fn from_header(header: ChunkHeader<'_>) -> Result<Self, ValidationError> {
        match header.chunk_type() {
            ChunkType::DATA => DataChunk::from_header(&header).map(Self::Data),
            ChunkType::INIT => InitChunk::from_header(&header).map(Self::Init),
            ChunkType::INIT_ACK => InitAckChunk::from_header(&header).map(Self::InitAck),
            _ => Ok(Self::Unknown(UnknownChunk::from(header))),
        }
    }

    /// Whether the chunk was decoded into a dedicated variant rather than [`AnyChunk::Unknown`].
    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl Chunk for AnyChunk {
    #[inline]
    fn chunk_type(&self) -> ChunkType {
        match self {
            Self::Data(c) => c.chunk_type(),
            Self::Init(c) => c.chunk_type(),
            Self::InitAck(c) => c.chunk_type(),
            Self::Unknown(c) => c.chunk_type(),
        }
    }

    #[inline]
    fn flags(&self) -> u8 {
        match self {
            Self::Data(c) => c.flags(),
            Self::Init(c) => c.flags(),
            Self::InitAck(c) => c.flags(),
            Self::Unknown(c) => c.flags(),
        }
    }

    #[inline]
    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError> {
        Self::from_header(ChunkHeader::unmarshal(raw)?)
    }

    #[inline]
    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        match self {
            Self::Data(c) => c.marshal_to(bytes),
            Self::Init(c) => c.marshal_to(bytes),
            Self::InitAck(c) => c.marshal_to(bytes),
            Self::Unknown(c) => c.marshal_to(bytes),
        }
    }

    #[inline]
    fn value_length(&self) -> usize {
        match self {
            Self::Data(c) => c.value_length(),
            Self::Init(c) => c.value_length(),
            Self::InitAck(c) => c.value_length(),
            Self::Unknown(c) => c.value_length(),
        }
    }
}

impl From<DataChunk> for AnyChunk {
    #[inline]
    fn from(value: DataChunk) -> Self {
        Self::Data(value)
    }
}

impl From<InitChunk> for AnyChunk {
    #[inline]
    fn from(value: InitChunk) -> Self {
        Self::Init(value)
    }
}

impl From<InitAckChunk> for AnyChunk {
    #[inline]
    fn from(value: InitAckChunk) -> Self {
        Self::InitAck(value)
    }
}

impl From<UnknownChunk> for AnyChunk {
    #[inline]
    fn from(value: UnknownChunk) -> Self {
        Self::Unknown(value)
    }
}

/// An iterator over the chunk headers in the Chunks region of an SCTP packet (everything after
/// the 12-byte common header).
///
/// Each chunk is decoded from the full remainder of the region, so that trailing padding of the
/// final chunk is validated by [`ChunkHeader::unmarshal()`]. Padding skipped between chunks is
/// checked here. Offsets in returned errors are relative to the start of the region. The
/// iterator stops after the first error.
#[derive(Clone, Copy, Debug)]
pub struct ChunksIter<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ChunksIter<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        ChunksIter { bytes, offset: 0 }
    }

    /// Decodes every remaining chunk into its [`AnyChunk`] variant.
    pub fn decode_all(self) -> Result<Vec<AnyChunk>, ValidationError> {
        self.map(|header| header.and_then(AnyChunk::from_header))
            .collect()
    }

    fn fail(&mut self, mut err: ValidationError) -> ValidationError {
        if let ValidationErrorType::NonZeroPadding { offset } = &mut err.err_type {
            *offset += self.offset;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            offset = self.offset,
            remaining = self.bytes.len(),
            error = %err,
            "stopped iterating over malformed SCTP chunks"
        );

        self.bytes = &[];
        err
    }
}

impl<'a> Iterator for ChunksIter<'a> {
    type Item = Result<ChunkHeader<'a>, ValidationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }

        let header = match ChunkHeader::unmarshal(self.bytes) {
            Ok(header) => header,
            Err(e) => return Some(Err(self.fail(e))),
        };

        let unpadded_len = header.length() as usize;
        // Fewer than 4 trailing bytes were already validated as this chunk's padding
        let end = if self.bytes.len() - unpadded_len < 4 {
            self.bytes.len()
        } else {
            header.padded_len()
        };

        if let Some(idx) = self.bytes[unpadded_len..end].iter().position(|&b| b != 0) {
            let err = ValidationError {
                chunk: "SCTP chunk header",
                err_type: ValidationErrorType::NonZeroPadding {
                    offset: unpadded_len + idx,
                },
                reason: "padding between chunks was non-zero",
            };
            return Some(Err(self.fail(err)));
        }

        self.bytes = &self.bytes[end..];
        self.offset += end;
        Some(Ok(header))
    }
}

/// Serializes `chunks` back to back into a Chunks region, zero-padding each chunk to a
/// multiple of 4 bytes.
pub fn bundle(chunks: &[AnyChunk]) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::with_capacity(chunks.iter().map(|c| c.padded_len()).sum());
    for chunk in chunks {
        chunk.marshal_to(&mut bytes)?;
        bytes.resize(crate::utils::padded_length::<4>(bytes.len()), 0);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunks() -> Vec<AnyChunk> {
        let mut init_ack = InitFields::new(7, 1500, 1, 1, 99);
        init_ack
            .params_mut()
            .push(InitParam::new(PARAM_STATE_COOKIE, vec![0xAB; 3]));

        vec![
            InitAckChunk::new(init_ack).into(),
            UnknownChunk::new(ChunkType(11), 0, Vec::new()).into(),
            DataChunk::new(1, 0, 0, 51, b"hello".to_vec()).into(),
            DataChunk::new(2, 0, 1, 51, b"world!!!".to_vec()).into(),
        ]
    }

    #[test]
    fn dispatch_by_type() {
        let bytes = DataChunk::new(5, 1, 1, 0, vec![1]).marshal().unwrap();
        let chunk = AnyChunk::unmarshal(&bytes).unwrap();
        assert!(matches!(chunk, AnyChunk::Data(_)));
        assert!(chunk.is_known());
        assert_eq!(chunk.chunk_type(), ChunkType::DATA);

        let chunk = AnyChunk::unmarshal(&[0x40, 0x00, 0x00, 0x04]).unwrap();
        assert!(!chunk.is_known());
        assert_eq!(chunk.chunk_type(), ChunkType(0x40));
    }

    #[test]
    fn dispatch_propagates_variant_errors() {
        let raw = [0x00, 0x00, 0x00, 0x08, 0, 0, 0, 1];
        let err = AnyChunk::unmarshal(&raw).unwrap_err();
        assert_eq!(err.chunk, "SCTP DATA chunk");
        assert_eq!(err.err_type, ValidationErrorType::MalformedLength);
    }

    #[test]
    fn bundle_then_iterate() {
        let chunks = sample_chunks();
        let region = bundle(&chunks).unwrap();
        assert_eq!(region.len() % 4, 0);

        let headers = ChunksIter::new(&region)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(headers.len(), 4);
        for (header, chunk) in headers.iter().zip(&chunks) {
            assert_eq!(header.chunk_type(), chunk.chunk_type());
            assert_eq!(header.value_length(), chunk.value_length());
        }

        assert_eq!(ChunksIter::new(&region).decode_all().unwrap(), chunks);
    }

    #[test]
    fn empty_region() {
        assert_eq!(ChunksIter::new(&[]).count(), 0);
    }

    #[test]
    fn nonzero_padding_between_chunks() {
        let mut region = bundle(&sample_chunks()[2..]).unwrap();
        // first DATA chunk: 12 + 5 = 17 byte value, length 21, padded to 24
        assert_eq!(region[21..24], [0, 0, 0]);
        region[22] = 0xFF;

        let mut iter = ChunksIter::new(&region);
        let err = iter.next().unwrap().unwrap_err();
        assert_eq!(
            err.err_type,
            ValidationErrorType::NonZeroPadding { offset: 22 }
        );
        assert!(iter.next().is_none());
    }

    #[test]
    fn final_padding_offset_is_region_relative() {
        let mut region = bundle(&sample_chunks()[2..]).unwrap();
        // both DATA chunks end on a 4-byte boundary at 48
        region.extend([0x40, 0x00, 0x00, 0x05, 0x01, 0x00, 0x07, 0x00]);

        let results: Vec<_> = ChunksIter::new(&region).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(
            results[2].unwrap_err().err_type,
            ValidationErrorType::NonZeroPadding { offset: 48 + 6 }
        );
    }

    #[test]
    fn truncated_chunk_stops_iteration() {
        let mut region = bundle(&sample_chunks()[2..]).unwrap();
        region.truncate(region.len() - 4);

        let results: Vec<_> = ChunksIter::new(&region).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].unwrap_err().err_type,
            ValidationErrorType::TooShort
        );
    }
}
