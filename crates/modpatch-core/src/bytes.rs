//! Bounds-checked little-endian reads over raw image bytes.
//!
//! All binary-format parsing in this crate goes through these helpers so that
//! a truncated or corrupt image surfaces as [`Error::MalformedImage`] with the
//! failing offset instead of a panic.

use crate::error::{Error, Result};

/// Reads a `u8` at `offset`.
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or_else(|| Error::malformed_image(offset, "read past end of image (u8)"))
}

/// Reads a little-endian `u16` at `offset`.
pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = slice(data, offset, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little-endian `u32` at `offset`.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = slice(data, offset, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads a little-endian `u64` at `offset`.
pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let bytes = slice(data, offset, 8)?;
    Ok(u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ]))
}

/// Returns `len` bytes starting at `offset`.
pub(crate) fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| Error::malformed_image(offset, "offset overflow"))?;
    data.get(offset..end)
        .ok_or_else(|| Error::malformed_image(offset, format!("read past end of image ({len} bytes)")))
}
