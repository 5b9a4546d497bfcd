//! `#Strings` and `#Blob` heap access.
//!
//! Heap indexes come out of the metadata tables; both heaps are plain byte
//! regions inside the metadata root. Strings are null-terminated UTF-8, blobs
//! carry the ECMA-335 compressed length prefix (II.24.2.4).

use crate::bytes::read_u16;
use crate::error::{Error, Result};

/// The `#Strings` heap: null-terminated UTF-8 strings addressed by byte index
#[derive(Debug, Clone, Copy)]
pub(crate) struct StringsHeap<'a> {
    data: &'a [u8],
}

impl<'a> StringsHeap<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Returns the string at `index`. Index 0 is the empty string.
    pub(crate) fn get(&self, index: u32) -> Result<&'a str> {
        let start = index as usize;
        let tail = self
            .data
            .get(start..)
            .ok_or_else(|| Error::malformed_image(start, "string index past end of #Strings"))?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::malformed_image(start, "unterminated string in #Strings"))?;
        std::str::from_utf8(&tail[..end])
            .map_err(|_| Error::malformed_image(start, "invalid UTF-8 in #Strings"))
    }
}

/// The `#Blob` heap: length-prefixed byte blobs addressed by byte index
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlobHeap<'a> {
    data: &'a [u8],
}

impl<'a> BlobHeap<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Returns the blob at `index`, without its length prefix.
    pub(crate) fn get(&self, index: u32) -> Result<&'a [u8]> {
        let start = index as usize;
        let tail = self
            .data
            .get(start..)
            .ok_or_else(|| Error::malformed_image(start, "blob index past end of #Blob"))?;
        let (len, header) = decode_compressed_u32(tail)
            .ok_or_else(|| Error::malformed_image(start, "invalid blob length prefix"))?;
        tail.get(header..header + len as usize)
            .ok_or_else(|| Error::malformed_image(start, "blob extends past end of #Blob"))
    }
}

/// Decodes an ECMA-335 compressed unsigned integer.
///
/// Returns the value and the number of header bytes consumed, or `None` when
/// the data is empty or uses the reserved `111` prefix.
pub(crate) fn decode_compressed_u32(data: &[u8]) -> Option<(u32, usize)> {
    let first = *data.first()?;
    if first & 0x80 == 0 {
        Some((u32::from(first), 1))
    } else if first & 0xc0 == 0x80 {
        let second = *data.get(1)?;
        Some(((u32::from(first & 0x3f) << 8) | u32::from(second), 2))
    } else if first & 0xe0 == 0xc0 {
        let rest = data.get(1..4)?;
        Some((
            (u32::from(first & 0x1f) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2]),
            4,
        ))
    } else {
        None
    }
}

/// Decodes the single fixed string argument of a custom-attribute value blob.
///
/// The blob layout is: u16 prolog `0x0001`, a SerString (compressed length +
/// UTF-8 bytes, or the single byte `0xFF` for null), then the named-argument
/// count. Returns `Ok(None)` for a null string.
pub(crate) fn decode_fixed_string_argument(blob: &[u8]) -> Result<Option<String>> {
    if read_u16(blob, 0)? != 0x0001 {
        return Err(Error::malformed_image(0, "custom attribute prolog mismatch"));
    }
    let body = &blob[2..];
    match body.first() {
        Some(0xff) => Ok(None),
        Some(_) => {
            let (len, header) = decode_compressed_u32(body)
                .ok_or_else(|| Error::malformed_image(2, "invalid SerString length"))?;
            let bytes = body
                .get(header..header + len as usize)
                .ok_or_else(|| Error::malformed_image(2, "SerString extends past blob"))?;
            let value = std::str::from_utf8(bytes)
                .map_err(|_| Error::malformed_image(2, "invalid UTF-8 in SerString"))?;
            Ok(Some(value.to_owned()))
        }
        None => Err(Error::malformed_image(2, "empty custom attribute body")),
    }
}
