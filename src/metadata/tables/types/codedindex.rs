//! Coded indices (ECMA-335 §II.24.2.6).
//!
//! A coded index packs a reference into one of several tables into a single column value:
//! the low `tag_bits` select the table, the remaining bits hold the 1-based row:
//!
//! ```text
//! value = (row << tag_bits) | tag        tag_bits = ceil(log2(number of tables))
//! ```
//!
//! The tag assignment per kind is fixed by the standard and reproduced in
//! [`CodedIndexType::tables`]. `CustomAttributeType` reserves tags 0, 1 and 4; decoding one of
//! them is a format error.

use strum::{EnumCount, EnumIter};

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The coded index kinds used by table columns.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// `TypeDef`, `TypeRef`, `TypeSpec`
    TypeDefOrRef,
    /// `Field`, `Param`, `Property`
    HasConstant,
    /// Any entity that can carry a custom attribute
    HasCustomAttribute,
    /// `Field`, `Param`
    HasFieldMarshal,
    /// `TypeDef`, `MethodDef`, `Assembly`
    HasDeclSecurity,
    /// `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, `TypeSpec`
    MemberRefParent,
    /// `Event`, `Property`
    HasSemantics,
    /// `MethodDef`, `MemberRef`
    MethodDefOrRef,
    /// `Field`, `MethodDef`
    MemberForwarded,
    /// `File`, `AssemblyRef`, `ExportedType`
    Implementation,
    /// `MethodDef` (tag 2), `MemberRef` (tag 3)
    CustomAttributeType,
    /// `Module`, `ModuleRef`, `AssemblyRef`, `TypeRef`
    ResolutionScope,
    /// `TypeDef`, `MethodDef`
    TypeOrMethodDef,
}

impl CodedIndexType {
    /// The tag-to-table mapping, indexed by tag. `None` marks a reserved tag.
    #[must_use]
    pub fn tables(&self) -> &'static [Option<TableId>] {
        use TableId as T;
        match self {
            CodedIndexType::TypeDefOrRef => &[Some(T::TypeDef), Some(T::TypeRef), Some(T::TypeSpec)],
            CodedIndexType::HasConstant => &[Some(T::Field), Some(T::Param), Some(T::Property)],
            CodedIndexType::HasCustomAttribute => &[
                Some(T::MethodDef),
                Some(T::Field),
                Some(T::TypeRef),
                Some(T::TypeDef),
                Some(T::Param),
                Some(T::InterfaceImpl),
                Some(T::MemberRef),
                Some(T::Module),
                // labelled 'Permission' in the standard, there is no such table
                Some(T::DeclSecurity),
                Some(T::Property),
                Some(T::Event),
                Some(T::StandAloneSig),
                Some(T::ModuleRef),
                Some(T::TypeSpec),
                Some(T::Assembly),
                Some(T::AssemblyRef),
                Some(T::File),
                Some(T::ExportedType),
                Some(T::ManifestResource),
                Some(T::GenericParam),
                Some(T::GenericParamConstraint),
                Some(T::MethodSpec),
            ],
            CodedIndexType::HasFieldMarshal => &[Some(T::Field), Some(T::Param)],
            CodedIndexType::HasDeclSecurity => {
                &[Some(T::TypeDef), Some(T::MethodDef), Some(T::Assembly)]
            }
            CodedIndexType::MemberRefParent => &[
                Some(T::TypeDef),
                Some(T::TypeRef),
                Some(T::ModuleRef),
                Some(T::MethodDef),
                Some(T::TypeSpec),
            ],
            CodedIndexType::HasSemantics => &[Some(T::Event), Some(T::Property)],
            CodedIndexType::MethodDefOrRef => &[Some(T::MethodDef), Some(T::MemberRef)],
            CodedIndexType::MemberForwarded => &[Some(T::Field), Some(T::MethodDef)],
            CodedIndexType::Implementation => {
                &[Some(T::File), Some(T::AssemblyRef), Some(T::ExportedType)]
            }
            CodedIndexType::CustomAttributeType => {
                &[None, None, Some(T::MethodDef), Some(T::MemberRef), None]
            }
            CodedIndexType::ResolutionScope => &[
                Some(T::Module),
                Some(T::ModuleRef),
                Some(T::AssemblyRef),
                Some(T::TypeRef),
            ],
            CodedIndexType::TypeOrMethodDef => &[Some(T::TypeDef), Some(T::MethodDef)],
        }
    }

    /// Number of low bits used for the tag: `ceil(log2(tables().len()))`.
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        let count = self.tables().len() as u32;
        u32::BITS - (count - 1).leading_zeros()
    }

    /// Encodes a reference to `row` of `table`, `None` if this kind cannot reference `table`.
    #[must_use]
    pub fn encode(&self, table: TableId, row: u32) -> Option<u32> {
        let tag = self.tables().iter().position(|t| *t == Some(table))?;
        let tag_bits = self.tag_bits();
        if row >= (1u32 << (32 - tag_bits)) {
            return None;
        }

        Some((row << tag_bits) | tag as u32)
    }

    /// Decodes a raw column value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag is out of range or reserved.
    pub fn decode(&self, value: u32) -> Result<CodedIndex> {
        let tag_bits = self.tag_bits();
        let tag = (value & ((1 << tag_bits) - 1)) as usize;
        let row = value >> tag_bits;

        match self.tables().get(tag) {
            Some(Some(table)) => Ok(CodedIndex::new(*table, row)),
            _ => Err(malformed_error!(
                "Invalid tag {} for coded index {:?} - {:#x}",
                tag,
                self,
                value
            )),
        }
    }
}

/// A decoded coded index: the target table, its row, and the equivalent token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The table this index points into
    pub tag: TableId,
    /// The 1-based row, `0` for a null reference
    pub row: u32,
    /// `Token::from_parts(tag, row)`
    pub token: Token,
}

impl CodedIndex {
    /// Creates a coded index pointing at `row` of `tag`.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// `true` for a null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn tag_bits() {
        assert_eq!(CodedIndexType::TypeDefOrRef.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasConstant.tag_bits(), 2);
        assert_eq!(CodedIndexType::HasCustomAttribute.tag_bits(), 5);
        assert_eq!(CodedIndexType::HasFieldMarshal.tag_bits(), 1);
        assert_eq!(CodedIndexType::HasDeclSecurity.tag_bits(), 2);
        assert_eq!(CodedIndexType::MemberRefParent.tag_bits(), 3);
        assert_eq!(CodedIndexType::HasSemantics.tag_bits(), 1);
        assert_eq!(CodedIndexType::MethodDefOrRef.tag_bits(), 1);
        assert_eq!(CodedIndexType::MemberForwarded.tag_bits(), 1);
        assert_eq!(CodedIndexType::Implementation.tag_bits(), 2);
        assert_eq!(CodedIndexType::CustomAttributeType.tag_bits(), 3);
        assert_eq!(CodedIndexType::ResolutionScope.tag_bits(), 2);
        assert_eq!(CodedIndexType::TypeOrMethodDef.tag_bits(), 1);
    }

    #[test]
    fn encode_decode_idempotent() {
        for kind in CodedIndexType::iter() {
            for table in kind.tables().iter().flatten() {
                for row in [0, 1, 2, 0x7F, 0x3FF, 0xFFFF, 0x00FF_FFFF] {
                    let value = kind.encode(*table, row).unwrap();
                    let decoded = kind.decode(value).unwrap();
                    assert_eq!(decoded.tag, *table, "{kind:?}");
                    assert_eq!(decoded.row, row, "{kind:?}");
                    assert_eq!(decoded.token, Token::from_parts(*table, row));
                }
            }
        }
    }

    #[test]
    fn known_values() {
        // TypeRef row 5 as TypeDefOrRef
        let decoded = CodedIndexType::TypeDefOrRef.decode(0x15).unwrap();
        assert_eq!(decoded, CodedIndex::new(TableId::TypeRef, 5));
        assert_eq!(decoded.token.value(), 0x0100_0005);

        // MemberRef row 1 as CustomAttributeType
        let decoded = CodedIndexType::CustomAttributeType.decode(0x0B).unwrap();
        assert_eq!(decoded.tag, TableId::MemberRef);
        assert_eq!(decoded.row, 1);

        assert_eq!(
            CodedIndexType::ResolutionScope.encode(TableId::AssemblyRef, 1),
            Some(0x06)
        );
    }

    #[test]
    fn invalid_tags() {
        // TypeDefOrRef tag 3 does not exist
        assert!(CodedIndexType::TypeDefOrRef.decode(0x07).is_err());
        // CustomAttributeType tags 0, 1 and 4 are reserved
        for tag in [0, 1, 4, 5, 7] {
            assert!(CodedIndexType::CustomAttributeType.decode((1 << 3) | tag).is_err());
        }
        assert_eq!(CodedIndexType::TypeDefOrRef.encode(TableId::Field, 1), None);
    }

    #[test]
    fn null_reference() {
        let decoded = CodedIndexType::Implementation.decode(0).unwrap();
        assert!(decoded.is_null());
        assert_eq!(decoded.tag, TableId::File);
    }
}
