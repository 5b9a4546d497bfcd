//! Physical metadata tables stream (`#~` / `#-`) parsing.
//!
//! The tables stream stores every metadata table back to back, with no
//! per-table directory: to address any row at all, the row size of every
//! preceding table must be computed from the header's row counts and
//! heap-size flags (ECMA-335 II.24.2.6). This module carries schemas for all
//! tables of the ECMA-335 range (ids 0x00–0x2C) for exactly that reason, even
//! though the patcher only ever reads four of them.
//!
//! Index sizing rules:
//! - heap indexes are 2 bytes, widened to 4 by the header's heap-size bits;
//! - a simple table index is 4 bytes once the target table exceeds 65535 rows;
//! - a coded index reserves its low bits for the member-table tag and widens
//!   to 4 bytes once any member table row count needs more than the remaining
//!   16 - tag bits.

use crate::bytes::{read_u16, read_u32, read_u64, read_u8, slice};
use crate::error::{Error, Result};

/// Highest table id defined by ECMA-335 (GenericParamConstraint)
const MAX_TABLE_ID: usize = 0x2c;

/// Identifiers of the metadata tables this reader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(dead_code)] // every id participates in layout computation via schema()
pub(crate) enum TableId {
    Module = 0x00,
    TypeRef = 0x01,
    TypeDef = 0x02,
    FieldPtr = 0x03,
    Field = 0x04,
    MethodPtr = 0x05,
    MethodDef = 0x06,
    ParamPtr = 0x07,
    Param = 0x08,
    InterfaceImpl = 0x09,
    MemberRef = 0x0a,
    Constant = 0x0b,
    CustomAttribute = 0x0c,
    FieldMarshal = 0x0d,
    DeclSecurity = 0x0e,
    ClassLayout = 0x0f,
    FieldLayout = 0x10,
    StandAloneSig = 0x11,
    EventMap = 0x12,
    EventPtr = 0x13,
    Event = 0x14,
    PropertyMap = 0x15,
    PropertyPtr = 0x16,
    Property = 0x17,
    MethodSemantics = 0x18,
    MethodImpl = 0x19,
    ModuleRef = 0x1a,
    TypeSpec = 0x1b,
    ImplMap = 0x1c,
    FieldRva = 0x1d,
    EncLog = 0x1e,
    EncMap = 0x1f,
    Assembly = 0x20,
    AssemblyProcessor = 0x21,
    AssemblyOs = 0x22,
    AssemblyRef = 0x23,
    AssemblyRefProcessor = 0x24,
    AssemblyRefOs = 0x25,
    File = 0x26,
    ExportedType = 0x27,
    ManifestResource = 0x28,
    NestedClass = 0x29,
    GenericParam = 0x2a,
    MethodSpec = 0x2b,
    GenericParamConstraint = 0x2c,
}

impl TableId {
    fn from_index(index: usize) -> Option<TableId> {
        use TableId::*;
        const ALL: [TableId; MAX_TABLE_ID + 1] = [
            Module,
            TypeRef,
            TypeDef,
            FieldPtr,
            Field,
            MethodPtr,
            MethodDef,
            ParamPtr,
            Param,
            InterfaceImpl,
            MemberRef,
            Constant,
            CustomAttribute,
            FieldMarshal,
            DeclSecurity,
            ClassLayout,
            FieldLayout,
            StandAloneSig,
            EventMap,
            EventPtr,
            Event,
            PropertyMap,
            PropertyPtr,
            Property,
            MethodSemantics,
            MethodImpl,
            ModuleRef,
            TypeSpec,
            ImplMap,
            FieldRva,
            EncLog,
            EncMap,
            Assembly,
            AssemblyProcessor,
            AssemblyOs,
            AssemblyRef,
            AssemblyRefProcessor,
            AssemblyRefOs,
            File,
            ExportedType,
            ManifestResource,
            NestedClass,
            GenericParam,
            MethodSpec,
            GenericParamConstraint,
        ];
        ALL.get(index).copied()
    }
}

/// Coded-index families used by the table schemas (ECMA-335 II.24.2.6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodedKind {
    TypeDefOrRef,
    HasConstant,
    HasCustomAttribute,
    HasFieldMarshal,
    HasDeclSecurity,
    MemberRefParent,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    Implementation,
    CustomAttributeType,
    ResolutionScope,
    TypeOrMethodDef,
}

impl CodedKind {
    fn tag_bits(self) -> u32 {
        match self {
            CodedKind::HasCustomAttribute => 5,
            CodedKind::MemberRefParent
            | CodedKind::CustomAttributeType => 3,
            CodedKind::TypeDefOrRef
            | CodedKind::HasConstant
            | CodedKind::HasDeclSecurity
            | CodedKind::Implementation
            | CodedKind::ResolutionScope => 2,
            CodedKind::HasFieldMarshal
            | CodedKind::HasSemantics
            | CodedKind::MethodDefOrRef
            | CodedKind::MemberForwarded
            | CodedKind::TypeOrMethodDef => 1,
        }
    }

    /// Member tables in tag order; `None` marks tags the standard leaves unused
    fn members(self) -> &'static [Option<TableId>] {
        use TableId::*;
        match self {
            CodedKind::TypeDefOrRef => &[Some(TypeDef), Some(TypeRef), Some(TypeSpec)],
            CodedKind::HasConstant => &[Some(Field), Some(Param), Some(Property)],
            CodedKind::HasCustomAttribute => &[
                Some(MethodDef),
                Some(Field),
                Some(TypeRef),
                Some(TypeDef),
                Some(Param),
                Some(InterfaceImpl),
                Some(MemberRef),
                Some(Module),
                Some(DeclSecurity),
                Some(Property),
                Some(Event),
                Some(StandAloneSig),
                Some(ModuleRef),
                Some(TypeSpec),
                Some(Assembly),
                Some(AssemblyRef),
                Some(File),
                Some(ExportedType),
                Some(ManifestResource),
                Some(GenericParam),
                Some(GenericParamConstraint),
                Some(MethodSpec),
            ],
            CodedKind::HasFieldMarshal => &[Some(Field), Some(Param)],
            CodedKind::HasDeclSecurity => &[Some(TypeDef), Some(MethodDef), Some(Assembly)],
            CodedKind::MemberRefParent => &[
                Some(TypeDef),
                Some(TypeRef),
                Some(ModuleRef),
                Some(MethodDef),
                Some(TypeSpec),
            ],
            CodedKind::HasSemantics => &[Some(Event), Some(Property)],
            CodedKind::MethodDefOrRef => &[Some(MethodDef), Some(MemberRef)],
            CodedKind::MemberForwarded => &[Some(Field), Some(MethodDef)],
            CodedKind::Implementation => &[Some(File), Some(AssemblyRef), Some(ExportedType)],
            CodedKind::CustomAttributeType => &[
                None,
                None,
                Some(MethodDef),
                Some(MemberRef),
                None,
            ],
            CodedKind::ResolutionScope => &[
                Some(Module),
                Some(ModuleRef),
                Some(AssemblyRef),
                Some(TypeRef),
            ],
            CodedKind::TypeOrMethodDef => &[Some(TypeDef), Some(MethodDef)],
        }
    }

    /// Splits a raw coded-index value into its target table and 1-based row.
    ///
    /// Returns `None` for an unused tag or a 0 ("null") row index.
    pub(crate) fn decode(self, value: u32) -> Option<(TableId, u32)> {
        let tag = (value & ((1 << self.tag_bits()) - 1)) as usize;
        let row = value >> self.tag_bits();
        if row == 0 {
            return None;
        }
        self.members().get(tag).copied().flatten().map(|t| (t, row))
    }
}

/// One column of a table row
#[derive(Debug, Clone, Copy)]
enum Column {
    /// Fixed-width integer of `n` bytes
    Fixed(u8),
    /// Index into the `#Strings` heap
    Str,
    /// Index into the `#GUID` heap
    Guid,
    /// Index into the `#Blob` heap
    Blob,
    /// Simple index into another table
    Table(TableId),
    /// Coded index
    Coded(CodedKind),
}

/// Row schemas per ECMA-335 II.22, in physical column order
fn schema(id: TableId) -> &'static [Column] {
    use Column::*;
    use TableId::*;
    match id {
        Module => &[Fixed(2), Str, Guid, Guid, Guid],
        TypeRef => &[Coded(CodedKind::ResolutionScope), Str, Str],
        TypeDef => &[
            Fixed(4),
            Str,
            Str,
            Coded(CodedKind::TypeDefOrRef),
            Table(Field),
            Table(MethodDef),
        ],
        FieldPtr => &[Table(Field)],
        Field => &[Fixed(2), Str, Blob],
        MethodPtr => &[Table(MethodDef)],
        MethodDef => &[Fixed(4), Fixed(2), Fixed(2), Str, Blob, Table(Param)],
        ParamPtr => &[Table(Param)],
        Param => &[Fixed(2), Fixed(2), Str],
        InterfaceImpl => &[Table(TypeDef), Coded(CodedKind::TypeDefOrRef)],
        MemberRef => &[Coded(CodedKind::MemberRefParent), Str, Blob],
        Constant => &[Fixed(1), Fixed(1), Coded(CodedKind::HasConstant), Blob],
        CustomAttribute => &[
            Coded(CodedKind::HasCustomAttribute),
            Coded(CodedKind::CustomAttributeType),
            Blob,
        ],
        FieldMarshal => &[Coded(CodedKind::HasFieldMarshal), Blob],
        DeclSecurity => &[Fixed(2), Coded(CodedKind::HasDeclSecurity), Blob],
        ClassLayout => &[Fixed(2), Fixed(4), Table(TypeDef)],
        FieldLayout => &[Fixed(4), Table(Field)],
        StandAloneSig => &[Blob],
        EventMap => &[Table(TypeDef), Table(Event)],
        EventPtr => &[Table(Event)],
        Event => &[Fixed(2), Str, Coded(CodedKind::TypeDefOrRef)],
        PropertyMap => &[Table(TypeDef), Table(Property)],
        PropertyPtr => &[Table(Property)],
        Property => &[Fixed(2), Str, Blob],
        MethodSemantics => &[Fixed(2), Table(MethodDef), Coded(CodedKind::HasSemantics)],
        MethodImpl => &[
            Table(TypeDef),
            Coded(CodedKind::MethodDefOrRef),
            Coded(CodedKind::MethodDefOrRef),
        ],
        ModuleRef => &[Str],
        TypeSpec => &[Blob],
        ImplMap => &[
            Fixed(2),
            Coded(CodedKind::MemberForwarded),
            Str,
            Table(ModuleRef),
        ],
        FieldRva => &[Fixed(4), Table(Field)],
        EncLog => &[Fixed(4), Fixed(4)],
        EncMap => &[Fixed(4)],
        Assembly => &[
            Fixed(4),
            Fixed(2),
            Fixed(2),
            Fixed(2),
            Fixed(2),
            Fixed(4),
            Blob,
            Str,
            Str,
        ],
        AssemblyProcessor => &[Fixed(4)],
        AssemblyOs => &[Fixed(4), Fixed(4), Fixed(4)],
        AssemblyRef => &[
            Fixed(2),
            Fixed(2),
            Fixed(2),
            Fixed(2),
            Fixed(4),
            Blob,
            Str,
            Str,
            Blob,
        ],
        AssemblyRefProcessor => &[Fixed(4), Table(AssemblyRef)],
        AssemblyRefOs => &[Fixed(4), Fixed(4), Fixed(4), Table(AssemblyRef)],
        File => &[Fixed(4), Str, Blob],
        ExportedType => &[Fixed(4), Fixed(4), Str, Str, Coded(CodedKind::Implementation)],
        ManifestResource => &[Fixed(4), Fixed(4), Str, Coded(CodedKind::Implementation)],
        NestedClass => &[Table(TypeDef), Table(TypeDef)],
        GenericParam => &[Fixed(2), Fixed(2), Coded(CodedKind::TypeOrMethodDef), Str],
        MethodSpec => &[Coded(CodedKind::MethodDefOrRef), Blob],
        GenericParamConstraint => &[Table(GenericParam), Coded(CodedKind::TypeDefOrRef)],
    }
}

/// Position and shape of one table inside the stream
#[derive(Debug, Clone, Copy, Default)]
struct TableLayout {
    rows: u32,
    row_size: usize,
    offset: usize,
}

/// Parsed view of the tables stream
#[derive(Debug)]
pub(crate) struct TablesStream<'a> {
    data: &'a [u8],
    string_index: usize,
    guid_index: usize,
    blob_index: usize,
    layouts: [TableLayout; MAX_TABLE_ID + 1],
}

/// CustomAttribute row: raw coded parent/ctor plus the value blob index
#[derive(Debug, Clone, Copy)]
pub(crate) struct CustomAttributeRow {
    pub(crate) parent: u32,
    pub(crate) ctor: u32,
    pub(crate) value: u32,
}

/// TypeRef row: `#Strings` indexes of name and namespace
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypeRefRow {
    pub(crate) name: u32,
    pub(crate) namespace: u32,
}

/// MemberRef row: raw coded parent class
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemberRefRow {
    pub(crate) class: u32,
}

/// AssemblyRef row: declared version and the `#Strings` index of the name
#[derive(Debug, Clone, Copy)]
pub(crate) struct AssemblyRefRow {
    pub(crate) major: u16,
    pub(crate) minor: u16,
    pub(crate) build: u16,
    pub(crate) revision: u16,
    pub(crate) name: u32,
}

impl<'a> TablesStream<'a> {
    /// Parses the stream header and computes the layout of every table.
    ///
    /// Fails on truncation or on a valid-bitmask bit outside the ECMA-335
    /// table range (portable-PDB tables are not supported).
    pub(crate) fn parse(data: &'a [u8]) -> Result<TablesStream<'a>> {
        let heap_sizes = read_u8(data, 6)?;
        let valid = read_u64(data, 8)?;

        let mut layouts = [TableLayout::default(); MAX_TABLE_ID + 1];
        let mut offset = 24;
        for bit in 0..64 {
            if valid & (1u64 << bit) == 0 {
                continue;
            }
            if bit > MAX_TABLE_ID {
                return Err(Error::malformed_image(
                    offset,
                    format!("unsupported metadata table {bit:#04x}"),
                ));
            }
            layouts[bit].rows = read_u32(data, offset)?;
            offset += 4;
        }

        let mut stream = TablesStream {
            data,
            string_index: if heap_sizes & 0x01 != 0 { 4 } else { 2 },
            guid_index: if heap_sizes & 0x02 != 0 { 4 } else { 2 },
            blob_index: if heap_sizes & 0x04 != 0 { 4 } else { 2 },
            layouts,
        };

        for index in 0..=MAX_TABLE_ID {
            let Some(id) = TableId::from_index(index) else {
                continue;
            };
            stream.layouts[index].row_size = schema(id)
                .iter()
                .map(|c| stream.column_size(*c))
                .sum();
            stream.layouts[index].offset = offset;
            offset += stream.layouts[index].row_size * stream.layouts[index].rows as usize;
        }

        Ok(stream)
    }

    /// Row count of `table` (0 when the table is absent)
    pub(crate) fn row_count(&self, table: TableId) -> u32 {
        self.layouts[table as usize].rows
    }

    fn table_index_size(&self, table: TableId) -> usize {
        if self.row_count(table) > 0xffff {
            4
        } else {
            2
        }
    }

    fn coded_index_size(&self, kind: CodedKind) -> usize {
        let max_rows = kind
            .members()
            .iter()
            .flatten()
            .map(|t| self.row_count(*t))
            .max()
            .unwrap_or(0);
        if u64::from(max_rows) >= 1u64 << (16 - kind.tag_bits()) {
            4
        } else {
            2
        }
    }

    fn column_size(&self, column: Column) -> usize {
        match column {
            Column::Fixed(n) => n as usize,
            Column::Str => self.string_index,
            Column::Guid => self.guid_index,
            Column::Blob => self.blob_index,
            Column::Table(t) => self.table_index_size(t),
            Column::Coded(k) => self.coded_index_size(k),
        }
    }

    /// Reads every column of the given 1-based row as widened integers
    fn row(&self, table: TableId, row: u32) -> Result<Vec<u64>> {
        let layout = self.layouts[table as usize];
        if row == 0 || row > layout.rows {
            return Err(Error::malformed_image(
                layout.offset,
                format!("row {row} out of range for table {table:?}"),
            ));
        }
        let mut offset = layout.offset + (row as usize - 1) * layout.row_size;
        // Make truncation surface here instead of per-column
        slice(self.data, offset, layout.row_size)?;

        let mut values = Vec::with_capacity(schema(table).len());
        for column in schema(table) {
            let size = self.column_size(*column);
            let value = match size {
                1 => u64::from(read_u8(self.data, offset)?),
                2 => u64::from(read_u16(self.data, offset)?),
                4 => u64::from(read_u32(self.data, offset)?),
                _ => unreachable!("column sizes are 1, 2 or 4 bytes"),
            };
            values.push(value);
            offset += size;
        }
        Ok(values)
    }

    /// Reads the 1-based CustomAttribute row
    pub(crate) fn custom_attribute(&self, row: u32) -> Result<CustomAttributeRow> {
        let v = self.row(TableId::CustomAttribute, row)?;
        Ok(CustomAttributeRow {
            parent: v[0] as u32,
            ctor: v[1] as u32,
            value: v[2] as u32,
        })
    }

    /// Reads the 1-based TypeRef row
    pub(crate) fn type_ref(&self, row: u32) -> Result<TypeRefRow> {
        let v = self.row(TableId::TypeRef, row)?;
        Ok(TypeRefRow {
            name: v[1] as u32,
            namespace: v[2] as u32,
        })
    }

    /// Reads the 1-based MemberRef row
    pub(crate) fn member_ref(&self, row: u32) -> Result<MemberRefRow> {
        let v = self.row(TableId::MemberRef, row)?;
        Ok(MemberRefRow { class: v[0] as u32 })
    }

    /// Reads the 1-based AssemblyRef row
    pub(crate) fn assembly_ref(&self, row: u32) -> Result<AssemblyRefRow> {
        let v = self.row(TableId::AssemblyRef, row)?;
        Ok(AssemblyRefRow {
            major: v[0] as u16,
            minor: v[1] as u16,
            build: v[2] as u16,
            revision: v[3] as u16,
            name: v[6] as u32,
        })
    }
}
