//! The metadata table stream (`#~` or `#-`).
//!
//! [`MetadataTables`] parses the stream header, derives the column widths from the heap size flags
//! and all row counts, then decodes every present table in ascending [`TableId`] order with a
//! single [`TableReader`] pass. After that the row arrays are immutable.
//!
//! ```text
//! u32 reserved | u8 major | u8 minor | u8 heap_sizes | u8 reserved | u64 valid | u64 sorted
//! u32 rows[popcount(valid)]             (ascending table id)
//! [u32 extra]                           (heap_sizes & 0x40)
//! rows of table 0x00, rows of table 0x01, ...
//! ```
//!
//! Table ids above `0x2C` have no known row layout. A stream that marks one of them valid with
//! rows fails with [`crate::Error::NotImplemented`], as does one that uses the `ParamPtr`
//! indirection.

mod assembly;
mod assemblyos;
mod assemblyprocessor;
mod assemblyref;
mod assemblyrefos;
mod assemblyrefprocessor;
mod classlayout;
mod constant;
mod customattribute;
mod declsecurity;
mod enclog;
mod encmap;
mod event;
mod eventmap;
mod eventptr;
mod exportedtype;
mod field;
mod fieldlayout;
mod fieldmarshal;
mod fieldptr;
mod fieldrva;
mod file;
mod genericparam;
mod genericparamconstraint;
mod implmap;
mod interfaceimpl;
mod manifestresource;
mod memberref;
mod methoddef;
mod methodimpl;
mod methodptr;
mod methodsemantics;
mod methodspec;
mod module;
mod moduleref;
mod nestedclass;
mod ownership;
mod param;
mod paramptr;
mod property;
mod propertymap;
mod propertyptr;
mod standalonesig;
mod typedef;
mod typeref;
mod typespec;
mod types;

pub use assembly::*;
pub use assemblyos::*;
pub use assemblyprocessor::*;
pub use assemblyref::*;
pub use assemblyrefos::*;
pub use assemblyrefprocessor::*;
pub use classlayout::*;
pub use constant::*;
pub use customattribute::*;
pub use declsecurity::*;
pub use enclog::*;
pub use encmap::*;
pub use event::*;
pub use eventmap::*;
pub use eventptr::*;
pub use exportedtype::*;
pub use field::*;
pub use fieldlayout::*;
pub use fieldmarshal::*;
pub use fieldptr::*;
pub use fieldrva::*;
pub use file::*;
pub use genericparam::*;
pub use genericparamconstraint::*;
pub use implmap::*;
pub use interfaceimpl::*;
pub use manifestresource::*;
pub use memberref::*;
pub use methoddef::*;
pub use methodimpl::*;
pub use methodptr::*;
pub use methodsemantics::*;
pub use methodspec::*;
pub use module::*;
pub use moduleref::*;
pub use nestedclass::*;
pub use param::*;
pub use paramptr::*;
pub use property::*;
pub use propertymap::*;
pub use propertyptr::*;
pub use standalonesig::*;
pub use typedef::*;
pub use typeref::*;
pub use typespec::*;
pub use types::*;

use strum::{EnumCount, IntoEnumIterator};

use crate::{file::io::read_le_at, Error, Result};

const HEADER_SIZE: usize = 24;

macro_rules! metadata_tables {
    ($($field:ident: $raw:ident => $id:ident,)*) => {
        /// All decoded tables of one module, one typed row array per [`TableId`].
        #[derive(Debug)]
        pub struct MetadataTables {
            /// Major version of the table schema, 2 for all current images
            pub major_version: u8,
            /// Minor version of the table schema
            pub minor_version: u8,
            /// Bit vector of the tables present in the stream
            pub valid: u64,
            /// Bit vector of the tables flagged as sorted
            pub sorted: u64,
            info: TableInfoRef,
            $(
                #[doc = concat!("The `", stringify!($id), "` table")]
                pub $field: MetadataTable<$raw>,
            )*
        }

        impl MetadataTables {
            fn read_tables(data: &[u8], info: &TableInfoRef) -> Result<Self> {
                let required: u64 = 0 $(
                    + u64::from($raw::row_size(info)) * u64::from(info.row_count(TableId::$id))
                )*;
                if required > data.len() as u64 {
                    return Err(out_of_bounds_error!());
                }

                let mut reader = TableReader::new(data, info.clone());
                Ok(MetadataTables {
                    major_version: 0,
                    minor_version: 0,
                    valid: 0,
                    sorted: 0,
                    info: info.clone(),
                    $(
                        $field: MetadataTable::read(&mut reader, info.row_count(TableId::$id))?,
                    )*
                })
            }
        }
    };
}

metadata_tables! {
    module: ModuleRaw => Module,
    typeref: TypeRefRaw => TypeRef,
    typedef: TypeDefRaw => TypeDef,
    fieldptr: FieldPtrRaw => FieldPtr,
    field: FieldRaw => Field,
    methodptr: MethodPtrRaw => MethodPtr,
    methoddef: MethodDefRaw => MethodDef,
    paramptr: ParamPtrRaw => ParamPtr,
    param: ParamRaw => Param,
    interfaceimpl: InterfaceImplRaw => InterfaceImpl,
    memberref: MemberRefRaw => MemberRef,
    constant: ConstantRaw => Constant,
    customattribute: CustomAttributeRaw => CustomAttribute,
    fieldmarshal: FieldMarshalRaw => FieldMarshal,
    declsecurity: DeclSecurityRaw => DeclSecurity,
    classlayout: ClassLayoutRaw => ClassLayout,
    fieldlayout: FieldLayoutRaw => FieldLayout,
    standalonesig: StandAloneSigRaw => StandAloneSig,
    eventmap: EventMapRaw => EventMap,
    eventptr: EventPtrRaw => EventPtr,
    event: EventRaw => Event,
    propertymap: PropertyMapRaw => PropertyMap,
    propertyptr: PropertyPtrRaw => PropertyPtr,
    property: PropertyRaw => Property,
    methodsemantics: MethodSemanticsRaw => MethodSemantics,
    methodimpl: MethodImplRaw => MethodImpl,
    moduleref: ModuleRefRaw => ModuleRef,
    typespec: TypeSpecRaw => TypeSpec,
    implmap: ImplMapRaw => ImplMap,
    fieldrva: FieldRvaRaw => FieldRVA,
    enclog: EncLogRaw => EncLog,
    encmap: EncMapRaw => EncMap,
    assembly: AssemblyRaw => Assembly,
    assemblyprocessor: AssemblyProcessorRaw => AssemblyProcessor,
    assemblyos: AssemblyOsRaw => AssemblyOS,
    assemblyref: AssemblyRefRaw => AssemblyRef,
    assemblyrefprocessor: AssemblyRefProcessorRaw => AssemblyRefProcessor,
    assemblyrefos: AssemblyRefOsRaw => AssemblyRefOS,
    file: FileRaw => File,
    exportedtype: ExportedTypeRaw => ExportedType,
    manifestresource: ManifestResourceRaw => ManifestResource,
    nestedclass: NestedClassRaw => NestedClass,
    genericparam: GenericParamRaw => GenericParam,
    methodspec: MethodSpecRaw => MethodSpec,
    genericparamconstraint: GenericParamConstraintRaw => GenericParamConstraint,
}

impl MetadataTables {
    /// Parses the table stream.
    ///
    /// `max_table_rows` bounds every row count before anything is allocated.
    ///
    /// # Errors
    /// - [`crate::Error::OutOfBounds`] if the header or the rows are truncated
    /// - [`crate::Error::Malformed`] if a row count exceeds `max_table_rows` or a coded index is
    ///   invalid
    /// - [`crate::Error::NotImplemented`] for `ParamPtr` rows or unknown tables with rows
    pub fn read(data: &[u8], max_table_rows: u32) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(out_of_bounds_error!());
        }

        let mut offset = 4_usize;
        let major_version = read_le_at::<u8>(data, &mut offset)?;
        let minor_version = read_le_at::<u8>(data, &mut offset)?;
        let heap_sizes = HeapSizes::from_bits_retain(read_le_at::<u8>(data, &mut offset)?);
        offset += 1;
        let valid = read_le_at::<u64>(data, &mut offset)?;
        let sorted = read_le_at::<u64>(data, &mut offset)?;

        let mut rows = [0u32; TableId::COUNT];
        for bit in 0..64_u8 {
            if valid & (1 << bit) == 0 {
                continue;
            }

            let count = read_le_at::<u32>(data, &mut offset)?;
            match TableId::from_u8(bit) {
                Some(table) => {
                    if count > max_table_rows {
                        return Err(malformed_error!(
                            "Table {:?} claims {} rows, the limit is {}",
                            table,
                            count,
                            max_table_rows
                        ));
                    }
                    rows[table as usize] = count;
                }
                None if count > 0 => {
                    return Err(Error::NotImplemented(format!(
                        "Table {bit:#04x} with {count} rows"
                    )));
                }
                None => {}
            }
        }

        if heap_sizes.contains(HeapSizes::EXTRA_DATA) {
            offset += 4;
        }

        if rows[TableId::ParamPtr as usize] > 0 {
            return Err(Error::NotImplemented(
                "ParamPtr indirection table".to_string(),
            ));
        }

        let info: TableInfoRef = std::sync::Arc::new(TableInfo::new(rows, heap_sizes));
        tracing::debug!(
            major_version,
            minor_version,
            heap_sizes = heap_sizes.bits(),
            valid = format_args!("{valid:#018x}"),
            tables = TableId::iter().filter(|t| info.row_count(*t) > 0).count(),
            "parsed table stream header"
        );

        let Some(body) = data.get(offset..) else {
            return Err(out_of_bounds_error!());
        };

        let mut tables = Self::read_tables(body, &info)?;
        tables.major_version = major_version;
        tables.minor_version = minor_version;
        tables.valid = valid;
        tables.sorted = sorted;
        Ok(tables)
    }

    /// Row counts and column widths of the stream.
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// Number of rows of `table`.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.info.row_count(table)
    }

    /// `true` if the stream marks `table` as sorted.
    #[must_use]
    pub fn is_sorted(&self, table: TableId) -> bool {
        self.sorted & table.mask() != 0
    }
}
