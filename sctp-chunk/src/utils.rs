// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2024 Nathaniel Bennett <me[at]nathanielbennett[dotcom]>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Byte-slice helpers
//!
//! Bounds-checked accessors shared by the header and chunk decoders.

/// Copies `T` bytes starting at `start` into an array, or returns `None` if the slice is too short.
#[inline]
pub fn to_array<const T: usize>(bytes: &[u8], start: usize) -> Option<[u8; T]> {
    Some(*get_array(bytes, start)?)
}

#[inline]
pub fn get_array<const T: usize>(bytes: &[u8], start: usize) -> Option<&[u8; T]> {
    bytes.get(start..start.checked_add(T)?)?.try_into().ok()
}

/// Reads a big-endian `u16` at `start`.
#[inline]
pub(crate) fn be_u16(bytes: &[u8], start: usize) -> Option<u16> {
    to_array(bytes, start).map(u16::from_be_bytes)
}

/// Reads a big-endian `u32` at `start`.
#[inline]
pub(crate) fn be_u32(bytes: &[u8], start: usize) -> Option<u32> {
    to_array(bytes, start).map(u32::from_be_bytes)
}

/// Rounds `unpadded_len` up to the next multiple of `T`.
#[inline]
pub fn padded_length<const T: usize>(unpadded_len: usize) -> usize {
    unpadded_len + ((T - (unpadded_len % T)) % T)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_length_rounds_up() {
        assert_eq!(padded_length::<4>(0), 0);
        assert_eq!(padded_length::<4>(4), 4);
        assert_eq!(padded_length::<4>(5), 8);
        assert_eq!(padded_length::<4>(7), 8);
        assert_eq!(padded_length::<4>(65535), 65536);
    }

    #[test]
    fn array_reads_are_bounds_checked() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(be_u16(&bytes, 2), Some(0x5678));
        assert_eq!(be_u32(&bytes, 0), Some(0x1234_5678));
        assert_eq!(be_u16(&bytes, 3), None);
        assert_eq!(get_array::<2>(&bytes, usize::MAX), None);
    }
}
