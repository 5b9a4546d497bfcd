//! Managed-assembly metadata inspection.
//!
//! Determines which framework version a managed assembly targets, using two
//! strategies in order:
//!
//! 1. **Declared attribute**: the assembly-level `TargetFrameworkAttribute`
//!    (`System.Runtime.Versioning`), whose single fixed string argument names
//!    the framework exactly (e.g. `".NETFramework,Version=v4.7.2"`).
//! 2. **Core-library inference**: the declared version of the `mscorlib`
//!    assembly reference, mapped to a profile label. Older assemblies predate
//!    the attribute entirely.
//!
//! Stage 2 runs when stage 1 finds no usable attribute, including when the
//! attribute rows themselves fail to decode; an image without managed
//! metadata at all is reported as such and never escalated to an error. The
//! inspection is read-only and tolerates the file being open elsewhere.

mod heaps;
mod tables;

use crate::bytes::{read_u16, read_u32, slice};
use crate::error::{Error, Result};
use crate::pe::PeFile;
use heaps::{decode_fixed_string_argument, BlobHeap, StringsHeap};
use std::path::Path;
use tables::{CodedKind, TableId, TablesStream};
use tracing::{debug, trace, warn};

/// Magic signature of the metadata root ("BSJB")
const METADATA_SIGNATURE: u32 = 0x424a_5342;

/// Attribute type name carrying the declared target framework
const TARGET_FRAMEWORK_ATTRIBUTE: &str = "TargetFrameworkAttribute";

/// Namespace of the runtime-versioning attributes
const VERSIONING_NAMESPACE: &str = "System.Runtime.Versioning";

/// Name of the foundational core runtime library
const CORE_LIBRARY: &str = "mscorlib";

/// How a framework version report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStrategy {
    /// Read from the assembly-level `TargetFrameworkAttribute`
    DeclaredAttribute,
    /// Inferred from the referenced core-library version
    InferredFromCoreLibrary,
    /// No usable information (native image, missing file, decode failure)
    Unavailable,
}

/// Best-effort determination of the framework version a target was built
/// against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameworkReport {
    /// Exact string declared by the `TargetFrameworkAttribute`
    Declared(String),
    /// Profile label inferred from the core-library reference version
    Inferred(String),
    /// The image carries no managed metadata (native executable)
    NoManagedMetadata,
    /// Managed metadata present, but neither strategy produced a version
    NotFound,
}

impl FrameworkReport {
    /// The strategy that produced this report
    pub fn strategy(&self) -> DetectionStrategy {
        match self {
            FrameworkReport::Declared(_) => DetectionStrategy::DeclaredAttribute,
            FrameworkReport::Inferred(_) => DetectionStrategy::InferredFromCoreLibrary,
            FrameworkReport::NoManagedMetadata | FrameworkReport::NotFound => {
                DetectionStrategy::Unavailable
            }
        }
    }

    /// The raw detected value, when one exists
    pub fn value(&self) -> Option<&str> {
        match self {
            FrameworkReport::Declared(s) | FrameworkReport::Inferred(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameworkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameworkReport::Declared(s) | FrameworkReport::Inferred(s) => f.write_str(s),
            FrameworkReport::NoManagedMetadata => f.write_str("no managed metadata"),
            FrameworkReport::NotFound => f.write_str("not determined"),
        }
    }
}

/// Detects the target framework of the assembly at `path`.
///
/// Never fails: read and decode errors are logged as warnings and degrade to
/// [`FrameworkReport::NotFound`], so a broken core assembly does not abort the
/// patch run.
pub fn detect_framework(path: &Path) -> FrameworkReport {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Could not read '{}' for version detection: {e}", path.display());
            return FrameworkReport::NotFound;
        }
    };
    match inspect_framework(&data) {
        Ok(report) => report,
        Err(e) => {
            warn!(
                "Version detection failed for '{}': {e}; continuing without it",
                path.display()
            );
            FrameworkReport::NotFound
        }
    }
}

/// Detects the target framework from the raw bytes of an image.
///
/// Strict variant of [`detect_framework`]: a malformed metadata structure
/// surfaces as an error instead of degrading. Decode failures inside the two
/// lookups stay local: a corrupt attribute row disables stage 1 only, and
/// stage 2 still runs.
pub fn inspect_framework(data: &[u8]) -> Result<FrameworkReport> {
    let Some(metadata) = ManagedMetadata::from_image(data)? else {
        debug!("Image carries no CLR metadata directory");
        return Ok(FrameworkReport::NoManagedMetadata);
    };

    // A decode failure inside either lookup disables that lookup only; the
    // other still gets its chance. Absent metadata never gets here.
    match metadata.declared_target_framework() {
        Ok(Some(declared)) => {
            debug!("Declared target framework: {declared}");
            return Ok(FrameworkReport::Declared(declared));
        }
        Ok(None) => {}
        Err(e) => warn!("Declared-attribute lookup failed: {e}"),
    }

    match metadata.core_library_profile() {
        Ok(Some(profile)) => {
            debug!("Inferred framework profile: {profile}");
            return Ok(FrameworkReport::Inferred(profile));
        }
        Ok(None) => {}
        Err(e) => warn!("Core-library lookup failed: {e}"),
    }

    Ok(FrameworkReport::NotFound)
}

/// Parsed view of an assembly's physical metadata: heaps plus tables
struct ManagedMetadata<'a> {
    strings: StringsHeap<'a>,
    blobs: BlobHeap<'a>,
    tables: TablesStream<'a>,
}

impl<'a> ManagedMetadata<'a> {
    /// Locates and parses the metadata of a PE image.
    ///
    /// Returns `Ok(None)` when the image has no CLR runtime directory: a
    /// valid outcome for native executables, not an error.
    fn from_image(data: &'a [u8]) -> Result<Option<ManagedMetadata<'a>>> {
        let pe = PeFile::parse(data)?;
        let Some((clr_rva, clr_size)) = pe.clr_directory() else {
            return Ok(None);
        };
        if clr_size < 72 {
            return Err(Error::malformed_image(
                clr_rva as usize,
                "CLR runtime header too small",
            ));
        }

        let cor20 = pe.slice_at_rva(data, clr_rva, clr_size)?;
        let metadata_rva = read_u32(cor20, 8)?;
        let metadata_size = read_u32(cor20, 12)?;
        let root = pe.slice_at_rva(data, metadata_rva, metadata_size)?;

        if read_u32(root, 0)? != METADATA_SIGNATURE {
            return Err(Error::malformed_image(0, "metadata root signature mismatch"));
        }
        let version_len = read_u32(root, 12)? as usize;
        let stream_count = read_u16(root, 18 + version_len)? as usize;

        let mut tables_bytes: Option<&[u8]> = None;
        let mut strings_bytes: Option<&[u8]> = None;
        let mut blob_bytes: Option<&[u8]> = None;

        let mut offset = 20 + version_len;
        for _ in 0..stream_count {
            let stream_offset = read_u32(root, offset)? as usize;
            let stream_size = read_u32(root, offset + 4)? as usize;
            let name_start = offset + 8;
            let name = read_stream_name(root, name_start)?;
            trace!("Metadata stream '{name}' at {stream_offset:#x} ({stream_size} bytes)");

            let bytes = slice(root, stream_offset, stream_size)?;
            match name {
                "#~" | "#-" => tables_bytes = Some(bytes),
                "#Strings" => strings_bytes = Some(bytes),
                "#Blob" => blob_bytes = Some(bytes),
                _ => {}
            }
            // Name field is padded to the next 4-byte boundary
            offset = name_start + (name.len() + 4) / 4 * 4;
        }

        let tables_bytes = tables_bytes
            .ok_or_else(|| Error::malformed_image(0, "metadata has no tables stream"))?;
        let strings_bytes = strings_bytes
            .ok_or_else(|| Error::malformed_image(0, "metadata has no #Strings heap"))?;

        Ok(Some(ManagedMetadata {
            strings: StringsHeap::new(strings_bytes),
            blobs: BlobHeap::new(blob_bytes.unwrap_or(&[])),
            tables: TablesStream::parse(tables_bytes)?,
        }))
    }

    /// Stage A: the assembly-level `TargetFrameworkAttribute` string, if any.
    ///
    /// Walks the CustomAttribute table for a row attached to the Assembly row
    /// whose constructor resolves through MemberRef to a TypeRef with the
    /// expected name and namespace. A null or non-string argument counts as
    /// not found.
    fn declared_target_framework(&self) -> Result<Option<String>> {
        for row in 1..=self.tables.row_count(TableId::CustomAttribute) {
            let attribute = self.tables.custom_attribute(row)?;

            match CodedKind::HasCustomAttribute.decode(attribute.parent) {
                Some((TableId::Assembly, _)) => {}
                _ => continue,
            }
            let Some((TableId::MemberRef, member_row)) =
                CodedKind::CustomAttributeType.decode(attribute.ctor)
            else {
                continue;
            };
            let member = self.tables.member_ref(member_row)?;
            let Some((TableId::TypeRef, type_row)) =
                CodedKind::MemberRefParent.decode(member.class)
            else {
                continue;
            };

            let type_ref = self.tables.type_ref(type_row)?;
            if self.strings.get(type_ref.name)? != TARGET_FRAMEWORK_ATTRIBUTE
                || self.strings.get(type_ref.namespace)? != VERSIONING_NAMESPACE
            {
                continue;
            }

            return decode_fixed_string_argument(self.blobs.get(attribute.value)?);
        }
        Ok(None)
    }

    /// Stage B: a profile label inferred from the `mscorlib` reference version
    fn core_library_profile(&self) -> Result<Option<String>> {
        for row in 1..=self.tables.row_count(TableId::AssemblyRef) {
            let reference = self.tables.assembly_ref(row)?;
            if self.strings.get(reference.name)? != CORE_LIBRARY {
                continue;
            }
            let version = format!(
                "{}.{}.{}.{}",
                reference.major, reference.minor, reference.build, reference.revision
            );
            let label = match reference.major {
                4 => format!(".NET 4.x profile (mscorlib v{version})"),
                2 => format!(".NET 3.5 profile (mscorlib v{version})"),
                _ => format!("unknown mscorlib version: {version}"),
            };
            return Ok(Some(label));
        }
        Ok(None)
    }
}

/// Reads a stream name: ASCII, null-terminated, at most 32 bytes
fn read_stream_name(root: &[u8], start: usize) -> Result<&str> {
    let region = root
        .get(start..)
        .ok_or_else(|| Error::malformed_image(start, "stream name past end of metadata"))?;
    let end = region
        .iter()
        .take(32)
        .position(|&b| b == 0)
        .ok_or_else(|| Error::malformed_image(start, "unterminated stream name"))?;
    std::str::from_utf8(&region[..end])
        .map_err(|_| Error::malformed_image(start, "non-ASCII stream name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pe::{inspect_architecture, Architecture};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// Builds complete synthetic PE images with or without CLR metadata.
    ///
    /// File layout: headers up to 0x200, one `.text` section mapped at RVA
    /// 0x2000 holding the Cor20 header followed by the metadata root. All
    /// table rows use 2-byte indexes (every row count stays tiny).
    #[derive(Default)]
    struct ImageBuilder {
        managed: bool,
        declared: Option<&'static str>,
        corrupt_prolog: bool,
        mscorlib: Option<(u16, u16, u16, u16)>,
    }

    /// Incrementally built #Strings heap
    struct Strings(Vec<u8>);

    impl Strings {
        fn new() -> Self {
            Strings(vec![0])
        }
        fn add(&mut self, s: &str) -> u16 {
            let index = self.0.len() as u16;
            self.0.extend_from_slice(s.as_bytes());
            self.0.push(0);
            index
        }
    }

    impl ImageBuilder {
        fn native() -> Self {
            ImageBuilder::default()
        }

        fn managed() -> Self {
            ImageBuilder {
                managed: true,
                ..ImageBuilder::default()
            }
        }

        fn with_declared(mut self, value: &'static str) -> Self {
            self.declared = Some(value);
            self
        }

        /// Mangles the attribute value blob's prolog (0x0001 -> 0x0002)
        fn with_corrupt_prolog(mut self) -> Self {
            self.corrupt_prolog = true;
            self
        }

        fn with_mscorlib(mut self, version: (u16, u16, u16, u16)) -> Self {
            self.mscorlib = Some(version);
            self
        }

        fn build(&self) -> Vec<u8> {
            let metadata = if self.managed {
                self.build_metadata()
            } else {
                Vec::new()
            };

            let mut image = vec![0u8; 0x200];
            image[0] = b'M';
            image[1] = b'Z';
            image[0x3c..0x40].copy_from_slice(&0x80u32.to_le_bytes());

            // PE signature + COFF header
            image[0x80..0x84].copy_from_slice(b"PE\0\0");
            image[0x84..0x86].copy_from_slice(&0x014cu16.to_le_bytes()); // machine: i386
            image[0x86..0x88].copy_from_slice(&1u16.to_le_bytes()); // one section
            image[0x94..0x96].copy_from_slice(&224u16.to_le_bytes()); // optional size

            // Optional header (PE32) at 0x98
            let opt = 0x98;
            image[opt..opt + 2].copy_from_slice(&0x10bu16.to_le_bytes());
            image[opt + 92..opt + 96].copy_from_slice(&16u32.to_le_bytes());
            if self.managed {
                let dir = opt + 96 + 14 * 8;
                image[dir..dir + 4].copy_from_slice(&0x2000u32.to_le_bytes());
                image[dir + 4..dir + 8].copy_from_slice(&72u32.to_le_bytes());
            }

            // Section table: .text at RVA 0x2000, raw offset 0x200
            let sect = opt + 224;
            image[sect..sect + 5].copy_from_slice(b".text");
            let content_size = (72 + metadata.len()) as u32;
            image[sect + 8..sect + 12].copy_from_slice(&content_size.max(0x100).to_le_bytes());
            image[sect + 12..sect + 16].copy_from_slice(&0x2000u32.to_le_bytes());
            image[sect + 16..sect + 20].copy_from_slice(&content_size.max(0x100).to_le_bytes());
            image[sect + 20..sect + 24].copy_from_slice(&0x200u32.to_le_bytes());

            if self.managed {
                // Cor20 header at 0x200 (RVA 0x2000)
                let mut cor20 = vec![0u8; 72];
                cor20[0..4].copy_from_slice(&72u32.to_le_bytes());
                cor20[4..6].copy_from_slice(&2u16.to_le_bytes());
                cor20[6..8].copy_from_slice(&5u16.to_le_bytes());
                cor20[8..12].copy_from_slice(&0x2048u32.to_le_bytes()); // metadata RVA
                cor20[12..16].copy_from_slice(&(metadata.len() as u32).to_le_bytes());
                cor20[16..20].copy_from_slice(&1u32.to_le_bytes());
                image.extend_from_slice(&cor20);
                image.extend_from_slice(&metadata);
            } else {
                image.extend_from_slice(&[0u8; 0x100]);
            }
            image
        }

        /// Metadata root: BSJB header, stream directory, #~, #Strings, #Blob
        fn build_metadata(&self) -> Vec<u8> {
            let mut strings = Strings::new();
            let assembly_name = strings.add("Game");

            let mut blob = vec![0u8];
            let mut tables: Vec<(u8, Vec<Vec<u8>>)> = Vec::new();

            // Module: generation, name, mvid, encid, encbaseid
            let module_name = strings.add("Game.exe");
            tables.push((0x00, vec![row(&[0, module_name, 0, 0, 0])]));

            if self.declared.is_some() {
                let attr_name = strings.add(TARGET_FRAMEWORK_ATTRIBUTE);
                let attr_ns = strings.add(VERSIONING_NAMESPACE);
                let ctor_name = strings.add(".ctor");
                // TypeRef: scope = Module row 1 (tag 0), name, namespace
                tables.push((0x01, vec![row(&[1 << 2, attr_name, attr_ns])]));
                // MemberRef: class = TypeRef row 1 (tag 1), name, signature
                tables.push((0x0a, vec![row(&[(1 << 3) | 1, ctor_name, 0])]));
            }

            if let Some(value) = self.declared {
                // Value blob: prolog, SerString, no named arguments
                let prolog: u16 = if self.corrupt_prolog { 0x0002 } else { 0x0001 };
                let mut body = prolog.to_le_bytes().to_vec();
                body.push(value.len() as u8);
                body.extend_from_slice(value.as_bytes());
                body.extend_from_slice(&[0x00, 0x00]);
                let value_index = blob.len() as u16;
                blob.push(body.len() as u8);
                blob.extend_from_slice(&body);

                // CustomAttribute: parent = Assembly row 1 (tag 14),
                // ctor = MemberRef row 1 (tag 3), value
                tables.push((0x0c, vec![row(&[(1 << 5) | 14, (1 << 3) | 3, value_index])]));
            }

            // Assembly: hashalg, version, flags, publickey, name, culture
            let mut assembly_row = Vec::new();
            assembly_row.extend_from_slice(&0x8004u32.to_le_bytes());
            assembly_row.extend_from_slice(&row(&[1, 0, 0, 0]));
            assembly_row.extend_from_slice(&0u32.to_le_bytes());
            assembly_row.extend_from_slice(&row(&[0, assembly_name, 0]));
            tables.push((0x20, vec![assembly_row]));

            if let Some((major, minor, build, revision)) = self.mscorlib {
                let name = strings.add(CORE_LIBRARY);
                let mut reference = Vec::new();
                reference.extend_from_slice(&row(&[major, minor, build, revision]));
                reference.extend_from_slice(&0u32.to_le_bytes());
                reference.extend_from_slice(&row(&[0, name, 0, 0]));
                tables.push((0x23, vec![reference]));
            }

            let mut stream = Vec::new();
            stream.extend_from_slice(&0u32.to_le_bytes());
            stream.push(2); // major
            stream.push(0); // minor
            stream.push(0); // heap sizes: all 2-byte
            stream.push(1); // reserved
            let valid = tables.iter().fold(0u64, |v, (id, _)| v | (1u64 << *id));
            stream.extend_from_slice(&valid.to_le_bytes());
            stream.extend_from_slice(&0u64.to_le_bytes()); // sorted
            for (_, rows) in &tables {
                stream.extend_from_slice(&(rows.len() as u32).to_le_bytes());
            }
            for (_, rows) in &tables {
                for r in rows {
                    stream.extend_from_slice(r);
                }
            }

            assemble_root(&stream, &strings.0, &blob)
        }
    }

    /// Encodes u16 column values little-endian
    fn row(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn assemble_root(tables: &[u8], strings: &[u8], blob: &[u8]) -> Vec<u8> {
        let pad4 = |n: usize| (n + 3) / 4 * 4;
        let version = b"v4.0.30319\0\0";

        // Fixed header (16 + version) + flags/count (4) + three stream headers
        let headers_len = 16 + version.len() + 4 + (8 + 4) + (8 + 12) + (8 + 8);
        let tables_offset = headers_len;
        let strings_offset = tables_offset + pad4(tables.len());
        let blob_offset = strings_offset + pad4(strings.len());

        let mut root = Vec::new();
        root.extend_from_slice(&METADATA_SIGNATURE.to_le_bytes());
        root.extend_from_slice(&1u16.to_le_bytes());
        root.extend_from_slice(&1u16.to_le_bytes());
        root.extend_from_slice(&0u32.to_le_bytes());
        root.extend_from_slice(&(version.len() as u32).to_le_bytes());
        root.extend_from_slice(version);
        root.extend_from_slice(&0u16.to_le_bytes()); // flags
        root.extend_from_slice(&3u16.to_le_bytes()); // stream count

        for (offset, size, name) in [
            (tables_offset, tables.len(), &b"#~\0\0"[..]),
            (strings_offset, strings.len(), &b"#Strings\0\0\0\0"[..]),
            (blob_offset, blob.len(), &b"#Blob\0\0\0"[..]),
        ] {
            root.extend_from_slice(&(offset as u32).to_le_bytes());
            root.extend_from_slice(&(size as u32).to_le_bytes());
            root.extend_from_slice(name);
        }

        debug_assert_eq!(root.len(), headers_len);
        root.extend_from_slice(tables);
        root.resize(strings_offset, 0);
        root.extend_from_slice(strings);
        root.resize(blob_offset, 0);
        root.extend_from_slice(blob);
        root
    }

    #[test]
    fn test_declared_attribute_returned_exactly() {
        let image = ImageBuilder::managed()
            .with_declared(".NETFramework,Version=v4.7.2")
            .build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(
            report,
            FrameworkReport::Declared(".NETFramework,Version=v4.7.2".into())
        );
        assert_eq!(report.strategy(), DetectionStrategy::DeclaredAttribute);
    }

    #[test]
    fn test_declared_attribute_wins_over_core_library() {
        let image = ImageBuilder::managed()
            .with_declared(".NETFramework,Version=v4.7.2")
            .with_mscorlib((4, 0, 0, 0))
            .build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(report.strategy(), DetectionStrategy::DeclaredAttribute);
    }

    #[test]
    fn test_mscorlib_major_4_infers_4x_profile() {
        let image = ImageBuilder::managed().with_mscorlib((4, 0, 0, 0)).build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(
            report,
            FrameworkReport::Inferred(".NET 4.x profile (mscorlib v4.0.0.0)".into())
        );
    }

    #[test]
    fn test_mscorlib_major_2_infers_35_profile() {
        let image = ImageBuilder::managed().with_mscorlib((2, 0, 5, 0)).build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(
            report,
            FrameworkReport::Inferred(".NET 3.5 profile (mscorlib v2.0.5.0)".into())
        );
    }

    #[test]
    fn test_unknown_mscorlib_major_reported_verbatim() {
        let image = ImageBuilder::managed().with_mscorlib((1, 1, 0, 0)).build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(
            report,
            FrameworkReport::Inferred("unknown mscorlib version: 1.1.0.0".into())
        );
    }

    #[test]
    fn test_corrupt_attribute_blob_falls_back_to_core_library() {
        let image = ImageBuilder::managed()
            .with_declared(".NETFramework,Version=v4.7.2")
            .with_corrupt_prolog()
            .with_mscorlib((4, 0, 0, 0))
            .build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(
            report,
            FrameworkReport::Inferred(".NET 4.x profile (mscorlib v4.0.0.0)".into())
        );
    }

    #[test]
    fn test_corrupt_attribute_blob_without_core_library_is_not_found() {
        let image = ImageBuilder::managed()
            .with_declared(".NETFramework,Version=v4.7.2")
            .with_corrupt_prolog()
            .build();
        assert_eq!(inspect_framework(&image).unwrap(), FrameworkReport::NotFound);
    }

    #[test]
    fn test_native_image_reports_no_managed_metadata() {
        let image = ImageBuilder::native().build();
        let report = inspect_framework(&image).unwrap();
        assert_eq!(report, FrameworkReport::NoManagedMetadata);
        assert_eq!(report.strategy(), DetectionStrategy::Unavailable);
    }

    #[test]
    fn test_metadata_without_attribute_or_mscorlib_is_not_found() {
        let image = ImageBuilder::managed().build();
        assert_eq!(inspect_framework(&image).unwrap(), FrameworkReport::NotFound);
    }

    #[test]
    fn test_detect_framework_degrades_on_missing_file() {
        let report = detect_framework(Path::new("/definitely/not/here.dll"));
        assert_eq!(report, FrameworkReport::NotFound);
    }

    #[test]
    fn test_detect_framework_degrades_on_garbage_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("garbage.dll");
        std::fs::write(&path, b"this is not an executable at all").unwrap();
        assert_eq!(detect_framework(&path), FrameworkReport::NotFound);
    }

    #[test]
    fn test_builder_images_classify_as_x86() {
        // The synthetic images double as PE fixtures for the arch inspector
        let image = ImageBuilder::managed().build();
        let arch = inspect_architecture(&mut Cursor::new(image)).unwrap();
        assert_eq!(arch, Architecture::X86);
    }
}
