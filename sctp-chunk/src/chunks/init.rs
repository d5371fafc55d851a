// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::error::{SerializationError, ValidationError, ValidationErrorType};
use crate::header::{ChunkHeader, ChunkType};
use crate::traits::{self, Chunk};
use crate::utils;

const INIT_NAME: &str = "SCTP INIT chunk";
const INIT_ACK_NAME: &str = "SCTP INIT ACK chunk";

// Initiate Tag, a_rwnd, Outbound Streams, Inbound Streams and Initial TSN
const INIT_FIXED_LEN: usize = 16;

const PARAM_HEADER_LEN: usize = 4;

/// The Parameter Type of the State Cookie carried in every INIT ACK.
pub const PARAM_STATE_COOKIE: u16 = 7;

/// A variable-length parameter of an INIT or INIT ACK chunk.
///
/// Parameters are kept in their Type-Length-Value form; the Value is not interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitParam {
    pub param_type: u16,
    pub value: Vec<u8>,
}

impl InitParam {
    #[inline]
    pub fn new(param_type: u16, value: Vec<u8>) -> Self {
        InitParam { param_type, value }
    }

    /// The Parameter Length: the 4-byte parameter header plus its Value, without padding.
    #[inline]
    pub fn len(&self) -> usize {
        PARAM_HEADER_LEN + self.value.len()
    }

    #[inline]
    pub fn padded_len(&self) -> usize {
        utils::padded_length::<4>(self.len())
    }

    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        let len = u16::try_from(self.len()).map_err(|_| SerializationError::ParamLengthOverflow {
            param_type: self.param_type,
            length: self.len(),
        })?;

        bytes.extend(self.param_type.to_be_bytes());
        bytes.extend(len.to_be_bytes());
        bytes.extend_from_slice(&self.value);
        Ok(())
    }
}

/// The fields shared by INIT and INIT ACK chunks (RFC 4960 sections 3.3.2 and 3.3.3).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 1/2  |  Chunk Flags  |      Chunk Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Initiate Tag                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |           Advertised Receiver Window Credit (a_rwnd)          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Number of Outbound Streams   |  Number of Inbound Streams    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Initial TSN                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// \                                                               \
/// /              Optional/Variable-Length Parameters              /
/// \                                                               \
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitFields {
    init_tag: u32,
    a_rwnd: u32,
    ostreams: u16,
    istreams: u16,
    init_tsn: u32,
    params: Vec<InitParam>,
}

impl InitFields {
    #[inline]
    pub fn new(init_tag: u32, a_rwnd: u32, ostreams: u16, istreams: u16, init_tsn: u32) -> Self {
        InitFields {
            init_tag,
            a_rwnd,
            ostreams,
            istreams,
            init_tsn,
            params: Vec::new(),
        }
    }

    /// The Verification Tag the sender expects to receive in every subsequent packet.
    #[inline]
    pub fn init_tag(&self) -> u32 {
        self.init_tag
    }

    #[inline]
    pub fn set_init_tag(&mut self, init_tag: u32) {
        self.init_tag = init_tag;
    }

    /// The Advertised Receiver Window Credit, in bytes.
    #[inline]
    pub fn a_rwnd(&self) -> u32 {
        self.a_rwnd
    }

    #[inline]
    pub fn set_a_rwnd(&mut self, a_rwnd: u32) {
        self.a_rwnd = a_rwnd;
    }

    #[inline]
    pub fn ostreams(&self) -> u16 {
        self.ostreams
    }

    #[inline]
    pub fn set_ostreams(&mut self, ostreams: u16) {
        self.ostreams = ostreams;
    }

    #[inline]
    pub fn istreams(&self) -> u16 {
        self.istreams
    }

    #[inline]
    pub fn set_istreams(&mut self, istreams: u16) {
        self.istreams = istreams;
    }

    #[inline]
    pub fn init_tsn(&self) -> u32 {
        self.init_tsn
    }

    #[inline]
    pub fn set_init_tsn(&mut self, init_tsn: u32) {
        self.init_tsn = init_tsn;
    }

    #[inline]
    pub fn params(&self) -> &[InitParam] {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut Vec<InitParam> {
        &mut self.params
    }

    /// Returns the first parameter with the given Parameter Type.
    #[inline]
    pub fn param(&self, param_type: u16) -> Option<&InitParam> {
        self.params.iter().find(|p| p.param_type == param_type)
    }

    /// The length of the encoded Value. Every parameter but the last is counted with its
    /// padding, since only the terminating padding of a chunk is excluded from its Length.
    pub fn value_length(&self) -> usize {
        let params_len = match self.params.split_last() {
            Some((last, rest)) => rest.iter().map(|p| p.padded_len()).sum::<usize>() + last.len(),
            None => 0,
        };

        INIT_FIXED_LEN + params_len
    }

    fn unmarshal(value: &[u8], chunk: &'static str) -> Result<Self, ValidationError> {
        let (Some(init_tag), Some(a_rwnd), Some(ostreams), Some(istreams), Some(init_tsn)) = (
            utils::be_u32(value, 0),
            utils::be_u32(value, 4),
            utils::be_u16(value, 8),
            utils::be_u16(value, 10),
            utils::be_u32(value, 12),
        ) else {
            return Err(ValidationError {
                chunk,
                err_type: ValidationErrorType::MalformedLength,
                reason: "Chunk Length too short to cover the fixed INIT fields",
            });
        };

        if init_tag == 0 {
            return Err(ValidationError {
                chunk,
                err_type: ValidationErrorType::InvalidValue,
                reason: "Initiate Tag must not be 0",
            });
        }

        if ostreams == 0 || istreams == 0 {
            return Err(ValidationError {
                chunk,
                err_type: ValidationErrorType::InvalidValue,
                reason: "Number of Outbound/Inbound Streams must not be 0",
            });
        }

        let mut params = Vec::new();
        let mut remaining = &value[INIT_FIXED_LEN..];
        while !remaining.is_empty() {
            let (Some(param_type), Some(param_len)) =
                (utils::be_u16(remaining, 0), utils::be_u16(remaining, 2))
            else {
                return Err(ValidationError {
                    chunk,
                    err_type: ValidationErrorType::TooShort,
                    reason: "insufficient bytes for parameter Type and Length fields",
                });
            };

            let param_len = param_len as usize;
            if param_len < PARAM_HEADER_LEN {
                return Err(ValidationError {
                    chunk,
                    err_type: ValidationErrorType::MalformedLength,
                    reason: "parameter Length field was smaller than the parameter header",
                });
            }

            let Some(param_value) = remaining.get(PARAM_HEADER_LEN..param_len) else {
                return Err(ValidationError {
                    chunk,
                    err_type: ValidationErrorType::TooShort,
                    reason: "parameter Length extended past the end of the chunk",
                });
            };

            params.push(InitParam::new(param_type, param_value.to_vec()));

            // The final parameter's padding lies outside of the Chunk Length
            let advance = utils::padded_length::<4>(param_len).min(remaining.len());
            remaining = &remaining[advance..];
        }

        Ok(InitFields {
            init_tag,
            a_rwnd,
            ostreams,
            istreams,
            init_tsn,
            params,
        })
    }

    fn marshal_value(&self) -> Result<Vec<u8>, SerializationError> {
        let mut value = Vec::with_capacity(self.value_length());
        value.extend(self.init_tag.to_be_bytes());
        value.extend(self.a_rwnd.to_be_bytes());
        value.extend(self.ostreams.to_be_bytes());
        value.extend(self.istreams.to_be_bytes());
        value.extend(self.init_tsn.to_be_bytes());

        if let Some((last, rest)) = self.params.split_last() {
            for param in rest {
                param.marshal_to(&mut value)?;
                value.resize(value.len() + (param.padded_len() - param.len()), 0);
            }
            last.marshal_to(&mut value)?;
        }

        Ok(value)
    }
}

/// An Initiation (INIT) chunk, sent to begin an association.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitChunk {
    flags: u8,
    fields: InitFields,
}

impl InitChunk {
    #[inline]
    pub fn new(fields: InitFields) -> Self {
        InitChunk { flags: 0, fields }
    }

    #[inline]
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    #[inline]
    pub fn fields(&self) -> &InitFields {
        &self.fields
    }

    #[inline]
    pub fn fields_mut(&mut self) -> &mut InitFields {
        &mut self.fields
    }

    /// Interprets the Value of an already-decoded INIT chunk header.
    pub(crate) fn from_header(header: &ChunkHeader<'_>) -> Result<Self, ValidationError> {
        Ok(InitChunk {
            flags: header.flags(),
            fields: InitFields::unmarshal(header.value(), INIT_NAME)?,
        })
    }
}

impl Chunk for InitChunk {
    #[inline]
    fn chunk_type(&self) -> ChunkType {
        ChunkType::INIT
    }

    #[inline]
    fn flags(&self) -> u8 {
        self.flags
    }

    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError> {
        let header = traits::unmarshal_typed(raw, ChunkType::INIT, INIT_NAME)?;
        Self::from_header(&header)
    }

    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        let value = self.fields.marshal_value()?;
        traits::marshal_value(bytes, ChunkType::INIT, self.flags, &value, INIT_NAME)
    }

    #[inline]
    fn value_length(&self) -> usize {
        self.fields.value_length()
    }
}

/// An Initiation Acknowledgement (INIT ACK) chunk, sent in response to an INIT.
///
/// Every INIT ACK carries a State Cookie parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitAckChunk {
    flags: u8,
    fields: InitFields,
}

impl InitAckChunk {
    #[inline]
    pub fn new(fields: InitFields) -> Self {
        InitAckChunk { flags: 0, fields }
    }

    #[inline]
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    #[inline]
    pub fn fields(&self) -> &InitFields {
        &self.fields
    }

    #[inline]
    pub fn fields_mut(&mut self) -> &mut InitFields {
        &mut self.fields
    }

    /// The Value of the State Cookie parameter, if present.
    #[inline]
    pub fn state_cookie(&self) -> Option<&[u8]> {
        self.fields
            .param(PARAM_STATE_COOKIE)
            .map(|p| p.value.as_slice())
    }

    /// Interprets the Value of an already-decoded INIT ACK chunk header.
    pub(crate) fn from_header(header: &ChunkHeader<'_>) -> Result<Self, ValidationError> {
        let fields = InitFields::unmarshal(header.value(), INIT_ACK_NAME)?;

        if fields.param(PARAM_STATE_COOKIE).is_none() {
            return Err(ValidationError {
                chunk: INIT_ACK_NAME,
                err_type: ValidationErrorType::InvalidValue,
                reason: "INIT ACK chunk is missing its State Cookie parameter",
            });
        }

        Ok(InitAckChunk {
            flags: header.flags(),
            fields,
        })
    }
}

impl Chunk for InitAckChunk {
    #[inline]
    fn chunk_type(&self) -> ChunkType {
        ChunkType::INIT_ACK
    }

    #[inline]
    fn flags(&self) -> u8 {
        self.flags
    }

    fn unmarshal(raw: &[u8]) -> Result<Self, ValidationError> {
        let header = traits::unmarshal_typed(raw, ChunkType::INIT_ACK, INIT_ACK_NAME)?;
        Self::from_header(&header)
    }

    fn marshal_to(&self, bytes: &mut Vec<u8>) -> Result<(), SerializationError> {
        let value = self.fields.marshal_value()?;
        traits::marshal_value(bytes, ChunkType::INIT_ACK, self.flags, &value, INIT_ACK_NAME)
    }

    #[inline]
    fn value_length(&self) -> usize {
        self.fields.value_length()
    }
}
