// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bitflags::bitflags;

use crate::error::{SerializationError, ValidationError, ValidationErrorType};
use crate::header::{ChunkHeader, ChunkType};
use crate::traits::{self, Chunk};
use crate::utils;

const CHUNK_NAME: &str = "SCTP DATA chunk";

// TSN, Stream Identifier, Stream Sequence Number and Payload Protocol Identifier
const DATA_FIXED_LEN: usize = 12;

bitflags! {
    /// The Chunk Flags of a Payload Data (DATA) chunk.
    ///
    /// Reserved bits are preserved when converting from and to raw bytes.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DataChunkFlags: u8 {
        /// The receiver should send its SACK without delay (RFC 7053).
        const IMMEDIATE = 0b_0000_1000;
        /// The chunk is unordered and bypasses stream sequencing.
        const UNORDERED = 0b_0000_0100;
        /// The chunk holds the first fragment of a user message.
        const BEGINNING = 0b_0000_0010;
        /// The chunk holds the last fragment of a user message.
        const ENDING = 0b_0000_0001;
    }
}

impl From<u8> for DataChunkFlags {
    #[inline]
    fn from(value: u8) -> Self {
        DataChunkFlags::from_bits_retain(value)
    }
}

/// A Payload Data (DATA) chunk, as defined in RFC 4960 section 3.3.1.
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0    | Reserved|U|B|E|    Length                     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                              TSN                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      Stream Identifier S      |   Stream Sequence Number n    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  Payload Protocol Identifier                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// \                                                               \
/// /                 User Data (seq n of Stream S)                 /
/// \                                                               \
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataChunk {
    flags: DataChunkFlags,
    tsn: u32,
    stream_id: u16,
    stream_seq: u16,
    proto_id: u32,
    user_data: Vec<u8>,
}

impl DataChunk {
    #[inline]
    pub fn new(tsn: u32, stream_id: u16, stream_seq: u16, proto_id: u32, user_data: Vec<u8>) -> Self {
        DataChunk {
            flags: DataChunkFlags::BEGINNING | DataChunkFlags::ENDING,
            tsn,
            stream_id,
            stream_seq,
            proto_id,
            user_data,
        }
    }

    #[inline]
    pub fn data_flags(&self) -> DataChunkFlags {
        self.flags
    }

    #[inline]
    pub fn set_flags(&mut self, flags: DataChunkFlags) {
        self.flags = flags;
    }

    /// The Transmission Sequence Number of the chunk.
    #[inline]
    pub fn tsn(&self) -> u32 {
        self.tsn
    }

    #[inline]
    pub fn set_tsn(&mut self, tsn: u32) {
        self.tsn = tsn;
    }

    #[inline]
    pub fn stream_id(&self) -> u16 {
        self.stream_id
    }

    #[inline]
    pub fn set_stream_id(&mut self, stream_id: u16) {
        self.stream_id = stream_id;
    }

    #[inline]
    pub fn stream_seq(&self) -> u16 {
        self.stream_seq
    }

    #[inline]
    pub fn set_stream_seq(&mut self, stream_seq: u16) {
        self.stream_seq = stream_seq;
    }

    /// The Payload Protocol Identifier. It is opaque to SCTP and passed through to the upper layer.
    #[inline]
    pub fn proto_id(&self) -> u32 {
        self.proto_id
    }

    #[inline]
    pub fn set_proto_id(&mut self, proto_id: u32) {
        self.proto_id = proto_id;
    }

    #[inline]
    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    #[inline]
    pub fn user_data_mut(&mut self) -> &mut Vec<u8> {
        &mut self.user_data
    }

    /// Interprets the Value of an already-decoded DATA chunk header.
    pub(crate) fn from_header(header: &ChunkHeader<'_>) -> Result<Self, ValidationError> {
        let value = header.value();

        let (Some(tsn), Some(stream_id), Some(stream_seq), Some(proto_id)) = (
            utils::be_u32(value, 0),
            utils::be_u16(value, 4),
            utils::be_u16(value, 6),
            utils::be_u32(value, 8),
        ) else {
            return Err(ValidationError {
                chunk: CHUNK_NAME,
                err_type: ValidationErrorType::MalformedLength,
                reason: "Chunk Length too short to cover the fixed DATA chunk fields",
            });
        };

        let user_data = &value[DATA_FIXED_LEN..];
        if user_data.is_empty() {
            return Err(ValidationError {
                chunk: CHUNK_NAME,
                err_type: ValidationErrorType::InvalidValue,
                reason: "DATA chunk carried no User Data",
            });
        }

        Ok(DataChunk {
            flags: DataChunkFlags::from(header.flags()),
            tsn,
            stream_id,
            stream_seq,
            proto_id,
            user_data: user_data.to_vec(),
        })
    }
}

impl Chunk for DataChunk {
    #[inline]
    fn chunk_type(&self) -> ChunkType {
        ChunkType::DATA
    }

    #[inline]
    fn flags(&self) -> u8 {
        self.flags.bits()
    }

    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError> {
        let header = traits::unmarshal_typed(raw, ChunkType::DATA, CHUNK_NAME)?;
        Self::from_header(&header)
    }

    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        let mut value = Vec::with_capacity(self.value_length());
        value.extend(self.tsn.to_be_bytes());
        value.extend(self.stream_id.to_be_bytes());
        value.extend(self.stream_seq.to_be_bytes());
        value.extend(self.proto_id.to_be_bytes());
        value.extend_from_slice(&self.user_data);

        traits::marshal_value(bytes, ChunkType::DATA, self.flags.bits(), &value, CHUNK_NAME)
    }

    #[inline]
    fn value_length(&self) -> usize {
        DATA_FIXED_LEN + self.user_data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA_BYTES: [u8; 20] = [
        0x00, 0x03, 0x00, 0x11, // type, flags (B|E), length = 17
        0x00, 0x00, 0x00, 0x2A, // TSN
        0x00, 0x01, 0x00, 0x02, // stream id, stream seq
        0x00, 0x00, 0x00, 0x33, // PPID
        0x68, 0x00, 0x00, 0x00, // "h" + 3 padding bytes
    ];

    #[test]
    fn decode_data_chunk() {
        let chunk = DataChunk::unmarshal(&DATA_BYTES).unwrap();
        assert_eq!(chunk.tsn(), 42);
        assert_eq!(chunk.stream_id(), 1);
        assert_eq!(chunk.stream_seq(), 2);
        assert_eq!(chunk.proto_id(), 0x33);
        assert_eq!(chunk.user_data(), b"h");
        assert!(chunk.data_flags().contains(DataChunkFlags::BEGINNING));
        assert!(chunk.data_flags().contains(DataChunkFlags::ENDING));
        assert!(!chunk.data_flags().contains(DataChunkFlags::UNORDERED));
        assert_eq!(chunk.value_length(), 13);
        assert_eq!(chunk.len(), 17);
        assert_eq!(chunk.padded_len(), 20);
    }

    #[test]
    fn encode_data_chunk() {
        let mut chunk = DataChunk::new(42, 1, 2, 0x33, b"h".to_vec());
        chunk.set_flags(DataChunkFlags::BEGINNING | DataChunkFlags::ENDING);
        assert_eq!(chunk.marshal().unwrap(), &DATA_BYTES[..17]);
    }

    #[test]
    fn reserved_flag_bits_survive() {
        let mut raw = DATA_BYTES;
        raw[1] = 0xF4;
        let chunk = DataChunk::unmarshal(&raw).unwrap();
        assert_eq!(chunk.flags(), 0xF4);
        assert!(chunk.data_flags().contains(DataChunkFlags::UNORDERED));
        assert_eq!(chunk.marshal().unwrap()[1], 0xF4);
    }

    #[test]
    fn fixed_fields_missing() {
        let raw = [0x00, 0x03, 0x00, 0x0C, 0, 0, 0, 1, 0, 1, 0, 2];
        let err = DataChunk::unmarshal(&raw).unwrap_err();
        assert_eq!(err.chunk, CHUNK_NAME);
        assert_eq!(err.err_type, ValidationErrorType::MalformedLength);
    }

    #[test]
    fn empty_user_data() {
        let raw = [
            0x00, 0x03, 0x00, 0x10, 0, 0, 0, 1, 0, 1, 0, 2, 0, 0, 0, 0,
        ];
        let err = DataChunk::unmarshal(&raw).unwrap_err();
        assert_eq!(err.err_type, ValidationErrorType::InvalidValue);
    }

    #[test]
    fn wrong_chunk_type() {
        let mut raw = DATA_BYTES;
        raw[0] = 9;
        let err = DataChunk::unmarshal(&raw).unwrap_err();
        assert_eq!(
            err.err_type,
            ValidationErrorType::UnexpectedType(ChunkType(9))
        );
    }

    #[test]
    fn bad_padding_is_attributed_to_data_chunk() {
        let mut raw = DATA_BYTES;
        raw[19] = 0x01;
        let err = DataChunk::unmarshal(&raw).unwrap_err();
        assert_eq!(err.chunk, CHUNK_NAME);
        assert_eq!(
            err.err_type,
            ValidationErrorType::NonZeroPadding { offset: 19 }
        );
    }

    #[test]
    fn oversized_user_data() {
        let chunk = DataChunk::new(1, 0, 0, 0, vec![0xAB; 65520]);
        let err = chunk.marshal().unwrap_err();
        assert_eq!(
            err,
            SerializationError::LengthOverflow {
                chunk: CHUNK_NAME,
                length: 65536,
            }
        );
    }
}
