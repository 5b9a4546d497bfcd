//! PE/COFF header inspection.
//!
//! Two consumers live here:
//!
//! 1. [`inspect_architecture`]: the patcher's 32/64-bit classification. It
//!    follows the classic recipe: read the PE header offset at `0x3C`, verify
//!    the `PE\0\0` signature, then read the machine-type field. Only the
//!    x86-64 marker (`0x8664`) is distinguished; every other machine value is
//!    classified as [`Architecture::X86`].
//! 2. [`PeFile`]: a minimal structural view (data directories, section
//!    table, RVA translation) used by the managed-metadata inspector to find
//!    the CLR runtime header. It is not a general PE parser.
//!
//! All reads are shared-access and never mutate the inspected file.

use crate::bytes::{read_u16, read_u32, slice};
use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// File offset of the little-endian u32 holding the PE header offset
const PE_POINTER_OFFSET: u64 = 0x3c;

/// The 4-byte ASCII sequence `PE\0\0`
const PE_SIGNATURE: u32 = 0x0000_4550;

/// Machine-type value for x86-64 images
const MACHINE_AMD64: u16 = 0x8664;

/// Optional-header magic for PE32 images
const OPT_MAGIC_PE32: u16 = 0x10b;

/// Optional-header magic for PE32+ images
const OPT_MAGIC_PE32_PLUS: u16 = 0x20b;

/// Data-directory index of the CLR runtime header
const CLR_DIRECTORY_INDEX: usize = 14;

/// Architecture classification of an executable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// 32-bit (any machine type other than x86-64)
    X86,
    /// 64-bit x86-64
    X64,
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86 (32-bit)"),
            Architecture::X64 => write!(f, "x64 (64-bit)"),
        }
    }
}

/// Classifies an executable image as 32- or 64-bit from its PE header.
///
/// The stream must be positioned at the start of the image. A missing or
/// mismatched `PE\0\0` signature fails with [`Error::MalformedImage`]; so does
/// a stream that ends inside the headers. Genuine I/O failures keep their
/// source as [`Error::ImageRead`].
pub fn inspect_architecture<R: Read + Seek>(reader: &mut R) -> Result<Architecture> {
    reader
        .seek(SeekFrom::Start(PE_POINTER_OFFSET))
        .map_err(|e| Error::image_read(PE_POINTER_OFFSET as usize, e))?;
    let pe_offset = read_u32_from(reader, PE_POINTER_OFFSET as usize)?;

    reader
        .seek(SeekFrom::Start(u64::from(pe_offset)))
        .map_err(|e| Error::image_read(pe_offset as usize, e))?;
    let signature = read_u32_from(reader, pe_offset as usize)?;
    if signature != PE_SIGNATURE {
        return Err(Error::malformed_image(
            pe_offset as usize,
            format!("PE signature mismatch: expected {PE_SIGNATURE:#010x}, found {signature:#010x}"),
        ));
    }

    let machine = read_u16_from(reader, pe_offset as usize + 4)?;
    trace!("Machine type: {machine:#06x}");

    Ok(if machine == MACHINE_AMD64 {
        Architecture::X64
    } else {
        Architecture::X86
    })
}

/// Classifies the executable at `path`, opening it with shared read access.
///
/// The file handle is released on every exit path; the file is never written.
pub fn inspect_architecture_at(path: &Path) -> Result<Architecture> {
    let mut file = std::fs::File::open(path).map_err(|e| Error::file_read(path, e))?;
    let arch = inspect_architecture(&mut file)?;
    debug!("{} classified as {arch}", path.display());
    Ok(arch)
}

/// Truncation is a malformed image; any other read failure is real I/O
fn read_exact_at<R: Read>(reader: &mut R, buf: &mut [u8], offset: usize) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            Error::malformed_image(offset, "unexpected end of image")
        }
        _ => Error::image_read(offset, e),
    })
}

fn read_u16_from<R: Read>(reader: &mut R, offset: usize) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact_at(reader, &mut buf, offset)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32_from<R: Read>(reader: &mut R, offset: usize) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact_at(reader, &mut buf, offset)?;
    Ok(u32::from_le_bytes(buf))
}

/// One entry of the PE section table, reduced to what RVA translation needs
#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_offset: u32,
    raw_size: u32,
}

/// Minimal structural view of a PE image held entirely in memory.
///
/// Provides just enough structure for the managed-metadata inspector: the
/// machine type, the CLR runtime data directory and RVA-to-file-offset
/// translation through the section table.
#[derive(Debug)]
pub struct PeFile {
    machine: u16,
    sections: Vec<Section>,
    clr_directory: Option<(u32, u32)>,
}

impl PeFile {
    /// Parses the headers of a PE image from its raw bytes.
    ///
    /// Fails with [`Error::MalformedImage`] on a missing `MZ` or `PE\0\0`
    /// signature, an unknown optional-header magic, or truncation anywhere in
    /// the headers.
    pub fn parse(data: &[u8]) -> Result<PeFile> {
        if read_u16(data, 0)? != u16::from_le_bytes(*b"MZ") {
            return Err(Error::malformed_image(0, "missing MZ signature"));
        }

        let pe_offset = read_u32(data, PE_POINTER_OFFSET as usize)? as usize;
        if read_u32(data, pe_offset)? != PE_SIGNATURE {
            return Err(Error::malformed_image(pe_offset, "PE signature mismatch"));
        }

        // COFF file header follows the signature
        let machine = read_u16(data, pe_offset + 4)?;
        let section_count = read_u16(data, pe_offset + 6)? as usize;
        let optional_size = read_u16(data, pe_offset + 20)? as usize;

        let optional_offset = pe_offset + 24;
        let magic = read_u16(data, optional_offset)?;
        let (dir_count_offset, dirs_offset) = match magic {
            OPT_MAGIC_PE32 => (optional_offset + 92, optional_offset + 96),
            OPT_MAGIC_PE32_PLUS => (optional_offset + 108, optional_offset + 112),
            _ => {
                return Err(Error::malformed_image(
                    optional_offset,
                    format!("unknown optional header magic {magic:#06x}"),
                ))
            }
        };
        let dir_count = read_u32(data, dir_count_offset)? as usize;

        let clr_directory = if dir_count > CLR_DIRECTORY_INDEX {
            let entry = dirs_offset + CLR_DIRECTORY_INDEX * 8;
            let rva = read_u32(data, entry)?;
            let size = read_u32(data, entry + 4)?;
            (rva != 0 && size != 0).then_some((rva, size))
        } else {
            None
        };

        let mut sections = Vec::with_capacity(section_count);
        let section_table = optional_offset + optional_size;
        for i in 0..section_count {
            let base = section_table + i * 40;
            // name[8] is skipped; only the address fields matter here
            sections.push(Section {
                virtual_size: read_u32(data, base + 8)?,
                virtual_address: read_u32(data, base + 12)?,
                raw_size: read_u32(data, base + 16)?,
                raw_offset: read_u32(data, base + 20)?,
            });
        }

        Ok(PeFile {
            machine,
            sections,
            clr_directory,
        })
    }

    /// Machine-type field from the COFF header
    pub fn machine(&self) -> u16 {
        self.machine
    }

    /// RVA and size of the CLR runtime header, if the directory entry exists
    pub fn clr_directory(&self) -> Option<(u32, u32)> {
        self.clr_directory
    }

    /// Translates an RVA to a file offset through the section table.
    ///
    /// Returns `None` when no section covers the RVA, or when a section
    /// header declares a raw offset that would overflow.
    pub fn rva_to_offset(&self, rva: u32) -> Option<usize> {
        self.sections.iter().find_map(|s| {
            let extent = s.virtual_size.max(s.raw_size);
            if rva < s.virtual_address || rva >= s.virtual_address.saturating_add(extent) {
                return None;
            }
            s.raw_offset
                .checked_add(rva - s.virtual_address)
                .map(|offset| offset as usize)
        })
    }

    /// Returns `size` bytes of `data` starting at the file position of `rva`
    pub fn slice_at_rva<'a>(&self, data: &'a [u8], rva: u32, size: u32) -> Result<&'a [u8]> {
        let offset = self.rva_to_offset(rva).ok_or_else(|| {
            Error::malformed_image(rva as usize, "RVA not covered by any section")
        })?;
        slice(data, offset, size as usize)
    }
}
