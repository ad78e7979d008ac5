//! Emits small but complete PE32 images with CLI metadata for tests.
//!
//! The produced file has one `.text` section at RVA `0x2000` (file offset `0x200`) that holds,
//! in order: the 72-byte CLI header, raw RVA data added through [`ImageBuilder::rva_data`],
//! the managed resources blob and the metadata root with its five streams. All heap and table
//! indices are written 2 bytes wide, so tests must stay below the 16-bit thresholds.

use std::collections::{BTreeMap, HashMap};

use crate::metadata::{
    tables::{CodedIndexType, TableId},
    token::Token,
};

const PE_OFFSET: usize = 0x80;
const SECTION_RVA: u32 = 0x2000;
const SECTION_OFFSET: usize = 0x200;
const FILE_ALIGNMENT: usize = 0x200;
const CLI_HEADER_SIZE: u32 = 72;

/// One column value of a table row.
#[derive(Clone, Debug)]
pub enum Col<'a> {
    /// 1-byte constant
    U8(u8),
    /// 2-byte constant
    U16(u16),
    /// 4-byte constant
    U32(u32),
    /// `#Strings` index, interned; the empty string is index 0
    Str(&'a str),
    /// `#Blob` index of a new entry
    Blob(&'a [u8]),
    /// `#Blob` index 0
    NoBlob,
    /// `#GUID` index of a new entry
    Guid([u8; 16]),
    /// Simple table index
    Index(u32),
    /// Coded index to `Token`, a null token encodes as 0
    Coded(CodedIndexType, Token),
}

/// Incrementally assembles metadata and serializes it into a PE32 image.
pub struct ImageBuilder {
    strings: Vec<u8>,
    string_map: HashMap<String, u32>,
    blob: Vec<u8>,
    guid: Vec<u8>,
    user_strings: Vec<u8>,
    tables: BTreeMap<TableId, (u32, Vec<u8>)>,
    rva_data: Vec<u8>,
    resources: Vec<u8>,
    version: String,
    entry_point: u32,
    metadata_signature: u32,
    extra_streams: Vec<(String, Vec<u8>)>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    pub fn new() -> Self {
        ImageBuilder {
            strings: vec![0],
            string_map: HashMap::new(),
            blob: vec![0],
            guid: Vec::new(),
            user_strings: vec![0],
            tables: BTreeMap::new(),
            rva_data: Vec::new(),
            resources: Vec::new(),
            version: "v4.0.30319".to_string(),
            entry_point: 0,
            metadata_signature: 0x424A_5342,
            extra_streams: Vec::new(),
        }
    }

    /// Interns `value` in `#Strings`.
    pub fn string(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if let Some(index) = self.string_map.get(value) {
            return *index;
        }

        let index = self.strings.len() as u32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        self.string_map.insert(value.to_string(), index);
        index
    }

    /// Appends a `#Blob` entry.
    pub fn blob(&mut self, value: &[u8]) -> u32 {
        let index = self.blob.len() as u32;
        self.blob.extend(compress_uint(value.len() as u32));
        self.blob.extend_from_slice(value);
        index
    }

    /// Appends a `#GUID` entry and returns its 1-based index.
    pub fn guid(&mut self, value: [u8; 16]) -> u32 {
        self.guid.extend_from_slice(&value);
        (self.guid.len() / 16) as u32
    }

    /// Appends a `#US` entry and returns its `0x70` token.
    pub fn user_string(&mut self, value: &str) -> Token {
        let offset = self.user_strings.len() as u32;
        let units: Vec<u16> = value.encode_utf16().collect();
        self.user_strings
            .extend(compress_uint(units.len() as u32 * 2 + 1));
        for unit in &units {
            self.user_strings.extend_from_slice(&unit.to_le_bytes());
        }
        self.user_strings.push(u8::from(units.iter().any(|&u| u > 0x7F)));
        Token::new(0x7000_0000 | offset)
    }

    /// Appends a row to `table` and returns its token.
    pub fn row(&mut self, table: TableId, columns: &[Col<'_>]) -> Token {
        let mut bytes = Vec::new();
        for column in columns {
            match column {
                Col::U8(value) => bytes.push(*value),
                Col::U16(value) => bytes.extend_from_slice(&value.to_le_bytes()),
                Col::U32(value) => bytes.extend_from_slice(&value.to_le_bytes()),
                Col::Str(value) => {
                    let index = self.string(value);
                    bytes.extend_from_slice(&(index as u16).to_le_bytes());
                }
                Col::Blob(value) => {
                    let index = self.blob(value);
                    bytes.extend_from_slice(&(index as u16).to_le_bytes());
                }
                Col::NoBlob => bytes.extend_from_slice(&[0, 0]),
                Col::Guid(value) => {
                    let index = self.guid(*value);
                    bytes.extend_from_slice(&(index as u16).to_le_bytes());
                }
                Col::Index(value) => bytes.extend_from_slice(&(*value as u16).to_le_bytes()),
                Col::Coded(kind, token) => {
                    let value = if token.is_null() {
                        0
                    } else {
                        let table = token.table_id().expect("coded index to a known table");
                        kind.encode(table, token.row())
                            .expect("table is not part of the coded index")
                    };
                    bytes.extend_from_slice(&(value as u16).to_le_bytes());
                }
            }
        }

        let entry = self.tables.entry(table).or_insert((0, Vec::new()));
        entry.0 += 1;
        entry.1.extend(bytes);
        Token::from_parts(table, entry.0)
    }

    /// Places raw bytes into the section and returns their RVA.
    pub fn rva_data(&mut self, data: &[u8]) -> u32 {
        let rva = SECTION_RVA + CLI_HEADER_SIZE + self.rva_data.len() as u32;
        self.rva_data.extend_from_slice(data);
        while self.rva_data.len() % 4 != 0 {
            self.rva_data.push(0);
        }
        rva
    }

    /// Appends a length-prefixed managed resource and returns its offset in the blob.
    pub fn resource(&mut self, data: &[u8]) -> u32 {
        let offset = self.resources.len() as u32;
        self.resources
            .extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.resources.extend_from_slice(data);
        while self.resources.len() % 8 != 0 {
            self.resources.push(0);
        }
        offset
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn entry_point(mut self, token: Token) -> Self {
        self.entry_point = token.value();
        self
    }

    pub fn metadata_signature(mut self, signature: u32) -> Self {
        self.metadata_signature = signature;
        self
    }

    /// Adds a stream with an arbitrary name to the metadata root.
    pub fn extra_stream(mut self, name: &str, data: Vec<u8>) -> Self {
        self.extra_streams.push((name.to_string(), data));
        self
    }

    /// Serializes the `#~` stream.
    pub fn tables_stream(&self) -> Vec<u8> {
        let mut valid = 0u64;
        for table in self.tables.keys() {
            valid |= 1u64 << (*table as u8);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0u32.to_le_bytes());
        out.push(2);
        out.push(0);
        out.push(0); // HeapSizes
        out.push(1);
        out.extend_from_slice(&valid.to_le_bytes());
        out.extend_from_slice(&0x0000_1600_3301_FA00u64.to_le_bytes());
        for (rows, _) in self.tables.values() {
            out.extend_from_slice(&rows.to_le_bytes());
        }
        for (_, bytes) in self.tables.values() {
            out.extend_from_slice(bytes);
        }
        pad4(&mut out);
        out
    }

    /// Serializes the metadata root and all streams.
    pub fn metadata(&self) -> Vec<u8> {
        let mut streams: Vec<(String, Vec<u8>)> = vec![
            ("#~".to_string(), self.tables_stream()),
            ("#Strings".to_string(), padded(&self.strings)),
            ("#US".to_string(), padded(&self.user_strings)),
            ("#GUID".to_string(), self.guid.clone()),
            ("#Blob".to_string(), padded(&self.blob)),
        ];
        streams.extend(self.extra_streams.iter().cloned());

        let mut version = self.version.as_bytes().to_vec();
        version.push(0);
        pad4(&mut version);

        let mut header_size = 16 + version.len() + 4;
        for (name, _) in &streams {
            header_size += 8 + ((name.len() + 4) & !3);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&self.metadata_signature.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(version.len() as u32).to_le_bytes());
        out.extend_from_slice(&version);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&(streams.len() as u16).to_le_bytes());

        let mut offset = header_size;
        for (name, data) in &streams {
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            let mut padded_name = name.as_bytes().to_vec();
            padded_name.push(0);
            pad4(&mut padded_name);
            out.extend_from_slice(&padded_name);
            offset += data.len();
        }
        debug_assert_eq!(out.len(), header_size);

        for (_, data) in &streams {
            out.extend_from_slice(data);
        }
        out
    }

    /// Serializes the complete PE image.
    pub fn build_image(&self) -> Vec<u8> {
        let metadata = self.metadata();
        let resources_rva = SECTION_RVA + CLI_HEADER_SIZE + self.rva_data.len() as u32;
        let metadata_rva = resources_rva + self.resources.len() as u32;

        let mut section = Vec::new();
        // CLI header
        section.extend_from_slice(&CLI_HEADER_SIZE.to_le_bytes());
        section.extend_from_slice(&2u16.to_le_bytes());
        section.extend_from_slice(&5u16.to_le_bytes());
        section.extend_from_slice(&metadata_rva.to_le_bytes());
        section.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        section.extend_from_slice(&1u32.to_le_bytes());
        section.extend_from_slice(&self.entry_point.to_le_bytes());
        if self.resources.is_empty() {
            section.extend_from_slice(&[0; 8]);
        } else {
            section.extend_from_slice(&resources_rva.to_le_bytes());
            section.extend_from_slice(&(self.resources.len() as u32).to_le_bytes());
        }
        section.extend_from_slice(&[0; 40]);
        debug_assert_eq!(section.len(), CLI_HEADER_SIZE as usize);

        section.extend_from_slice(&self.rva_data);
        section.extend_from_slice(&self.resources);
        section.extend_from_slice(&metadata);

        let virtual_size = section.len() as u32;
        let raw_size = align_up(section.len(), FILE_ALIGNMENT);
        section.resize(raw_size, 0);

        let mut image = vec![0u8; SECTION_OFFSET];
        image[0] = b'M';
        image[1] = b'Z';
        image[0x3C..0x40].copy_from_slice(&(PE_OFFSET as u32).to_le_bytes());

        let mut headers = Vec::new();
        headers.extend_from_slice(b"PE\0\0");
        // COFF file header
        headers.extend_from_slice(&0x014Cu16.to_le_bytes());
        headers.extend_from_slice(&1u16.to_le_bytes());
        headers.extend_from_slice(&[0; 12]);
        headers.extend_from_slice(&224u16.to_le_bytes());
        headers.extend_from_slice(&0x2102u16.to_le_bytes());
        // optional header, standard fields
        headers.extend_from_slice(&0x010Bu16.to_le_bytes());
        headers.extend_from_slice(&[8, 0]);
        headers.extend_from_slice(&(raw_size as u32).to_le_bytes());
        headers.extend_from_slice(&[0; 8]);
        headers.extend_from_slice(&0u32.to_le_bytes());
        headers.extend_from_slice(&SECTION_RVA.to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes());
        // optional header, windows fields
        headers.extend_from_slice(&0x0040_0000u32.to_le_bytes());
        headers.extend_from_slice(&0x2000u32.to_le_bytes());
        headers.extend_from_slice(&(FILE_ALIGNMENT as u32).to_le_bytes());
        headers.extend_from_slice(&4u16.to_le_bytes());
        headers.extend_from_slice(&0u16.to_le_bytes());
        headers.extend_from_slice(&[0; 4]);
        headers.extend_from_slice(&4u16.to_le_bytes());
        headers.extend_from_slice(&0u16.to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes());
        let size_of_image = SECTION_RVA + align_up(virtual_size as usize, 0x2000) as u32;
        headers.extend_from_slice(&size_of_image.to_le_bytes());
        headers.extend_from_slice(&(SECTION_OFFSET as u32).to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes());
        headers.extend_from_slice(&3u16.to_le_bytes());
        headers.extend_from_slice(&0x8540u16.to_le_bytes());
        headers.extend_from_slice(&0x0010_0000u32.to_le_bytes());
        headers.extend_from_slice(&0x1000u32.to_le_bytes());
        headers.extend_from_slice(&0x0010_0000u32.to_le_bytes());
        headers.extend_from_slice(&0x1000u32.to_le_bytes());
        headers.extend_from_slice(&0u32.to_le_bytes());
        headers.extend_from_slice(&16u32.to_le_bytes());
        // data directories
        for index in 0..16 {
            if index == 14 {
                headers.extend_from_slice(&SECTION_RVA.to_le_bytes());
                headers.extend_from_slice(&CLI_HEADER_SIZE.to_le_bytes());
            } else {
                headers.extend_from_slice(&[0; 8]);
            }
        }
        // section table
        headers.extend_from_slice(b".text\0\0\0");
        headers.extend_from_slice(&virtual_size.to_le_bytes());
        headers.extend_from_slice(&SECTION_RVA.to_le_bytes());
        headers.extend_from_slice(&(raw_size as u32).to_le_bytes());
        headers.extend_from_slice(&(SECTION_OFFSET as u32).to_le_bytes());
        headers.extend_from_slice(&[0; 12]);
        headers.extend_from_slice(&0x6000_0020u32.to_le_bytes());

        image[PE_OFFSET..PE_OFFSET + headers.len()].copy_from_slice(&headers);
        image.extend_from_slice(&section);
        image
    }
}

/// Rows of the tables the scenario tests use, with columns in table order.
impl ImageBuilder {
    pub fn module(&mut self, name: &str) -> Token {
        self.row(
            TableId::Module,
            &[
                Col::U16(0),
                Col::Str(name),
                Col::Guid([0x11; 16]),
                Col::Index(0),
                Col::Index(0),
            ],
        )
    }

    pub fn assembly(&mut self, name: &str, version: [u16; 4]) -> Token {
        self.row(
            TableId::Assembly,
            &[
                Col::U32(0x8004),
                Col::U16(version[0]),
                Col::U16(version[1]),
                Col::U16(version[2]),
                Col::U16(version[3]),
                Col::U32(0),
                Col::NoBlob,
                Col::Str(name),
                Col::Str(""),
            ],
        )
    }

    pub fn assembly_ref(&mut self, name: &str, version: [u16; 4]) -> Token {
        self.row(
            TableId::AssemblyRef,
            &[
                Col::U16(version[0]),
                Col::U16(version[1]),
                Col::U16(version[2]),
                Col::U16(version[3]),
                Col::U32(0),
                Col::NoBlob,
                Col::Str(name),
                Col::Str(""),
                Col::NoBlob,
            ],
        )
    }

    pub fn module_ref(&mut self, name: &str) -> Token {
        self.row(TableId::ModuleRef, &[Col::Str(name)])
    }

    /// A `TypeDef` row; `fields` and `methods` are the first owned rows.
    pub fn type_def(
        &mut self,
        flags: u32,
        namespace: &str,
        name: &str,
        extends: Token,
        fields: u32,
        methods: u32,
    ) -> Token {
        self.row(
            TableId::TypeDef,
            &[
                Col::U32(flags),
                Col::Str(name),
                Col::Str(namespace),
                Col::Coded(CodedIndexType::TypeDefOrRef, extends),
                Col::Index(fields),
                Col::Index(methods),
            ],
        )
    }

    pub fn type_ref(&mut self, scope: Token, namespace: &str, name: &str) -> Token {
        self.row(
            TableId::TypeRef,
            &[
                Col::Coded(CodedIndexType::ResolutionScope, scope),
                Col::Str(name),
                Col::Str(namespace),
            ],
        )
    }

    pub fn type_spec(&mut self, signature: &[u8]) -> Token {
        self.row(TableId::TypeSpec, &[Col::Blob(signature)])
    }

    pub fn field(&mut self, flags: u16, name: &str, signature: &[u8]) -> Token {
        self.row(
            TableId::Field,
            &[Col::U16(flags), Col::Str(name), Col::Blob(signature)],
        )
    }

    /// A `MethodDef` row; `params` is the first owned `Param` row.
    pub fn method(&mut self, flags: u16, name: &str, signature: &[u8], params: u32) -> Token {
        self.row(
            TableId::MethodDef,
            &[
                Col::U32(0),
                Col::U16(0),
                Col::U16(flags),
                Col::Str(name),
                Col::Blob(signature),
                Col::Index(params),
            ],
        )
    }

    pub fn param(&mut self, flags: u16, sequence: u16, name: &str) -> Token {
        self.row(
            TableId::Param,
            &[Col::U16(flags), Col::U16(sequence), Col::Str(name)],
        )
    }

    pub fn member_ref(&mut self, parent: Token, name: &str, signature: &[u8]) -> Token {
        self.row(
            TableId::MemberRef,
            &[
                Col::Coded(CodedIndexType::MemberRefParent, parent),
                Col::Str(name),
                Col::Blob(signature),
            ],
        )
    }

    pub fn method_spec(&mut self, method: Token, instantiation: &[u8]) -> Token {
        self.row(
            TableId::MethodSpec,
            &[
                Col::Coded(CodedIndexType::MethodDefOrRef, method),
                Col::Blob(instantiation),
            ],
        )
    }

    pub fn generic_param(&mut self, number: u16, owner: Token, name: &str) -> Token {
        self.row(
            TableId::GenericParam,
            &[
                Col::U16(number),
                Col::U16(0),
                Col::Coded(CodedIndexType::TypeOrMethodDef, owner),
                Col::Str(name),
            ],
        )
    }

    pub fn generic_param_constraint(&mut self, owner: Token, constraint: Token) -> Token {
        self.row(
            TableId::GenericParamConstraint,
            &[
                Col::Index(owner.row()),
                Col::Coded(CodedIndexType::TypeDefOrRef, constraint),
            ],
        )
    }

    pub fn nested_class(&mut self, nested: Token, enclosing: Token) -> Token {
        self.row(
            TableId::NestedClass,
            &[Col::Index(nested.row()), Col::Index(enclosing.row())],
        )
    }

    pub fn constant(&mut self, base: u8, parent: Token, value: &[u8]) -> Token {
        self.row(
            TableId::Constant,
            &[
                Col::U8(base),
                Col::U8(0),
                Col::Coded(CodedIndexType::HasConstant, parent),
                Col::Blob(value),
            ],
        )
    }

    pub fn custom_attribute(&mut self, parent: Token, constructor: Token, value: &[u8]) -> Token {
        self.row(
            TableId::CustomAttribute,
            &[
                Col::Coded(CodedIndexType::HasCustomAttribute, parent),
                Col::Coded(CodedIndexType::CustomAttributeType, constructor),
                Col::Blob(value),
            ],
        )
    }

    pub fn property_map(&mut self, parent: Token, first_property: u32) -> Token {
        self.row(
            TableId::PropertyMap,
            &[Col::Index(parent.row()), Col::Index(first_property)],
        )
    }

    pub fn property(&mut self, flags: u16, name: &str, signature: &[u8]) -> Token {
        self.row(
            TableId::Property,
            &[Col::U16(flags), Col::Str(name), Col::Blob(signature)],
        )
    }

    pub fn event_map(&mut self, parent: Token, first_event: u32) -> Token {
        self.row(
            TableId::EventMap,
            &[Col::Index(parent.row()), Col::Index(first_event)],
        )
    }

    pub fn event(&mut self, flags: u16, name: &str, event_type: Token) -> Token {
        self.row(
            TableId::Event,
            &[
                Col::U16(flags),
                Col::Str(name),
                Col::Coded(CodedIndexType::TypeDefOrRef, event_type),
            ],
        )
    }

    pub fn method_semantics(&mut self, semantics: u16, method: Token, association: Token) -> Token {
        self.row(
            TableId::MethodSemantics,
            &[
                Col::U16(semantics),
                Col::Index(method.row()),
                Col::Coded(CodedIndexType::HasSemantics, association),
            ],
        )
    }

    pub fn file(&mut self, flags: u32, name: &str, hash: &[u8]) -> Token {
        self.row(
            TableId::File,
            &[Col::U32(flags), Col::Str(name), Col::Blob(hash)],
        )
    }

    pub fn exported_type(
        &mut self,
        namespace: &str,
        name: &str,
        implementation: Token,
    ) -> Token {
        self.row(
            TableId::ExportedType,
            &[
                Col::U32(0x0020_0000),
                Col::U32(0),
                Col::Str(name),
                Col::Str(namespace),
                Col::Coded(CodedIndexType::Implementation, implementation),
            ],
        )
    }

    pub fn manifest_resource(&mut self, offset: u32, name: &str, implementation: Token) -> Token {
        self.row(
            TableId::ManifestResource,
            &[
                Col::U32(offset),
                Col::U32(1),
                Col::Str(name),
                Col::Coded(CodedIndexType::Implementation, implementation),
            ],
        )
    }
}

/// Signature blobs for the scenario tests.
pub mod sig {
    use crate::metadata::token::Token;

    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const I4: u8 = 0x08;
    pub const STRING: u8 = 0x0E;
    pub const BYREF: u8 = 0x10;
    pub const VALUETYPE: u8 = 0x11;
    pub const CLASS: u8 = 0x12;
    pub const VAR: u8 = 0x13;
    pub const ARRAY: u8 = 0x14;
    pub const GENERICINST: u8 = 0x15;
    pub const OBJECT: u8 = 0x1C;
    pub const SZARRAY: u8 = 0x1D;
    pub const MVAR: u8 = 0x1E;

    /// `TypeDefOrRef` encoding of a type token inside a signature.
    pub fn type_token(token: Token) -> Vec<u8> {
        let tag = match token.value() >> 24 {
            0x02 => 0,
            0x01 => 1,
            _ => 2,
        };
        super::compress_uint((token.row() << 2) | tag)
    }

    pub fn class(token: Token) -> Vec<u8> {
        let mut out = vec![CLASS];
        out.extend(type_token(token));
        out
    }

    pub fn field(ty: &[u8]) -> Vec<u8> {
        let mut out = vec![0x06];
        out.extend_from_slice(ty);
        out
    }

    /// A method signature; `generic` > 0 adds the `GENERIC` flag and count.
    pub fn method(has_this: bool, generic: u32, ret: &[u8], params: &[&[u8]]) -> Vec<u8> {
        let mut flags = if has_this { 0x20 } else { 0x00 };
        if generic > 0 {
            flags |= 0x10;
        }
        let mut out = vec![flags];
        if generic > 0 {
            out.extend(super::compress_uint(generic));
        }
        out.extend(super::compress_uint(params.len() as u32));
        out.extend_from_slice(ret);
        for param in params {
            out.extend_from_slice(param);
        }
        out
    }

    pub fn property(has_this: bool, ty: &[u8], params: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![if has_this { 0x28 } else { 0x08 }];
        out.extend(super::compress_uint(params.len() as u32));
        out.extend_from_slice(ty);
        for param in params {
            out.extend_from_slice(param);
        }
        out
    }

    pub fn generic_inst(definition: Token, args: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![GENERICINST, CLASS];
        out.extend(type_token(definition));
        out.extend(super::compress_uint(args.len() as u32));
        for arg in args {
            out.extend_from_slice(arg);
        }
        out
    }

    pub fn method_spec(args: &[&[u8]]) -> Vec<u8> {
        let mut out = vec![0x0A];
        out.extend(super::compress_uint(args.len() as u32));
        for arg in args {
            out.extend_from_slice(arg);
        }
        out
    }
}

/// Encodes an ECMA-335 compressed unsigned integer.
pub fn compress_uint(value: u32) -> Vec<u8> {
    if value <= 0x7F {
        vec![value as u8]
    } else if value <= 0x3FFF {
        vec![0x80 | (value >> 8) as u8, value as u8]
    } else {
        vec![
            0xC0 | (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]
    }
}

fn pad4(data: &mut Vec<u8>) {
    while data.len() % 4 != 0 {
        data.push(0);
    }
}

fn padded(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    pad4(&mut out);
    out
}

fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}
