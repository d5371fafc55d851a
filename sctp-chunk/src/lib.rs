// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A library for decoding, validating and encoding the chunks carried in an SCTP packet.
//!
//! Every chunk begins with the common header defined in RFC 4960 section 3.2:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Chunk Type  | Chunk  Flags  |        Chunk Length           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! |                          Chunk Value                          |
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! [`ChunkHeader`] decodes that header and hands out a borrowed view of the Value field.
//! Concrete chunks ([`DataChunk`], [`InitChunk`], [`InitAckChunk`] and [`UnknownChunk`])
//! implement the [`Chunk`] trait on top of it, and [`AnyChunk`] dispatches between them by
//! Chunk Type.

#![forbid(unsafe_code)]
#![allow(clippy::len_without_is_empty)]

pub mod chunks;
pub mod error;
pub mod header;
pub mod traits;
pub mod utils;

pub use chunks::{
    bundle, AnyChunk, ChunksIter, DataChunk, DataChunkFlags, InitAckChunk, InitChunk,
    InitFields, InitParam, UnknownChunk,
};
pub use error::{SerializationError, ValidationError, ValidationErrorType};
pub use header::{ChunkHeader, ChunkType, CHUNK_HEADER_SIZE, MAX_VALUE_LEN};
pub use traits::Chunk;
