//! One physical module: headers, heaps, tables and the entities built from them.
//!
//! [`ModuleImage::load`] runs the whole read pass up front, in a fixed order:
//!
//! 1. PE layout (done by [`File`])
//! 2. CLI header from data directory 14
//! 3. Metadata root and stream headers
//! 4. The four heaps, copied out of the image
//! 5. The table stream, every row decoded
//!
//! After that the row arrays and heaps never change. Everything else (types, members,
//! resolved signatures) is built on first request and cached for the lifetime of the module.
//!
//! Token resolution lives in the [`resolver`] submodule.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilreader::{Universe, UniverseOptions};
//!
//! let universe = Universe::new(UniverseOptions::default());
//! let module = universe.load_module_file("tests/samples/library.dll".as_ref())?;
//! println!("{} ({})", module.name(), module.image_runtime_version());
//! for ty in module.get_types()? {
//!     println!("  {ty}");
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

mod resolver;

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock, RwLock, Weak,
    },
};

use crate::{
    file::File,
    metadata::{
        assembly::AssemblyImage,
        cache::EntityCache,
        cor20header::{Cor20Header, COR20_HEADER_SIZE},
        identity::AssemblyIdentity,
        members::{
            CustomAttribute, EventDefinition, FieldDefinition, HasCustomAttributes,
            MethodDefinition, ParameterDefinition, PropertyDefinition, TypeDefinition,
        },
        root::Root,
        streams::{Blob, Guid, Heaps, Strings, UserStrings},
        tables::{MetadataTables, TableId},
        token::Token,
        typesystem::{ConstantValue, GenericArguments, GenericTypeParameter, Type, TypeRc},
        universe::{Universe, UniverseOptions},
    },
    Error, Result,
};

/// Token of the single `Module` row.
const MODULE_TOKEN: Token = Token(0x0000_0001);

/// Where a top-level type name leads.
#[derive(Clone, Copy, Debug)]
enum TypeEntry {
    /// A `TypeDef` row of this module
    Defined(u32),
    /// An `ExportedType` row: forwarded to another assembly or defined in another file
    Exported(u32),
}

/// All `TypeDef` rows wrapped as types, plus the name index used by `find_type`.
struct TypeTable {
    types: Vec<TypeRc>,
    by_name: HashMap<(String, String), TypeEntry>,
}

/// A loaded module and the entry point of token resolution.
pub struct ModuleImage {
    this: Weak<ModuleImage>,
    universe: Weak<Universe>,
    assembly: OnceLock<Weak<AssemblyImage>>,
    options: UniverseOptions,
    file: RwLock<Option<File>>,
    disposed: AtomicBool,
    location: Option<PathBuf>,
    cor20: Cor20Header,
    root: Root,
    heaps: Heaps,
    tables: MetadataTables,
    name: Arc<str>,
    cache: EntityCache,
    types: OnceLock<TypeTable>,
}

fn heap_bytes(root: &Root, metadata: &[u8], name: &str, limit: u32) -> Result<Option<Vec<u8>>> {
    let Some(data) = root.stream_data(metadata, name) else {
        return Ok(None);
    };
    if data.len() as u64 > u64::from(limit) {
        return Err(malformed_error!(
            "Heap {} has {} bytes, the limit is {}",
            name,
            data.len(),
            limit
        ));
    }

    Ok(Some(data.to_vec()))
}

impl ModuleImage {
    /// Reads headers, heaps and tables of `file`.
    ///
    /// The module is not attached to an assembly; [`AssemblyImage`] does that for the modules
    /// it owns.
    ///
    /// # Errors
    /// Returns a format error at the first structure that does not parse, and
    /// [`Error::NotImplemented`] for `ParamPtr` rows.
    pub(crate) fn load(
        file: File,
        universe: Weak<Universe>,
        options: UniverseOptions,
    ) -> Result<Arc<ModuleImage>> {
        let (cli_rva, _) = file.cli_header_directory()?;
        let cor20 = Cor20Header::read(file.read_rva(cli_rva, COR20_HEADER_SIZE)?)?;
        let metadata = file.read_rva(cor20.meta_data_rva, cor20.meta_data_size as usize)?;
        let root = Root::read(metadata)?;

        let limit = options.max_heap_size;
        let heaps = Heaps {
            strings: match heap_bytes(&root, metadata, "#Strings", limit)? {
                Some(data) => Strings::from(data)?,
                None => Strings::empty(),
            },
            blob: match heap_bytes(&root, metadata, "#Blob", limit)? {
                Some(data) => Blob::from(data)?,
                None => Blob::empty(),
            },
            guid: match heap_bytes(&root, metadata, "#GUID", limit)? {
                Some(data) => Guid::from(data)?,
                None => Guid::empty(),
            },
            user_strings: match heap_bytes(&root, metadata, "#US", limit)? {
                Some(data) => UserStrings::from(data)?,
                None => UserStrings::empty(),
            },
        };

        let Some(tables_data) = root.tables_stream(metadata) else {
            return Err(malformed_error!("Metadata has no table stream"));
        };
        let tables = MetadataTables::read(tables_data, options.max_table_rows)?;

        let Some(module_row) = tables.module.get(1) else {
            return Err(malformed_error!("Module table is empty"));
        };
        let name = heaps.get_name(module_row.name)?;
        let location = file.path().map(Path::to_path_buf);

        tracing::debug!(
            module = &*name,
            runtime = root.version.as_str(),
            types = tables.typedef.row_count(),
            methods = tables.methoddef.row_count(),
            "loaded module"
        );

        let cache = EntityCache::new(&tables);
        Ok(Arc::new_cyclic(|this| ModuleImage {
            this: this.clone(),
            universe,
            assembly: OnceLock::new(),
            options,
            file: RwLock::new(Some(file)),
            disposed: AtomicBool::new(false),
            location,
            cor20,
            root,
            heaps,
            tables,
            name,
            cache,
            types: OnceLock::new(),
        }))
    }

    pub(crate) fn attach(&self, assembly: Weak<AssemblyImage>) {
        if self.assembly.set(assembly).is_err() {
            tracing::warn!(module = &*self.name, "module is already attached to an assembly");
        }
    }

    /// The `Module` row name, e.g. `library.dll`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module version id.
    ///
    /// # Errors
    /// Returns a format error for a bad `#GUID` index.
    pub fn mvid(&self) -> Result<Option<uguid::Guid>> {
        match self.tables.module.get(1) {
            Some(row) => self.heaps.get_guid(row.mvid),
            None => Ok(None),
        }
    }

    /// Runtime version string of the metadata root, e.g. `v4.0.30319`.
    #[must_use]
    pub fn image_runtime_version(&self) -> &str {
        &self.root.version
    }

    /// The CLI header.
    #[must_use]
    pub fn cor20_header(&self) -> &Cor20Header {
        &self.cor20
    }

    /// The managed entry point, `None` for libraries and native entry points.
    #[must_use]
    pub fn entry_point_token(&self) -> Option<Token> {
        self.cor20.entry_point()
    }

    /// The decoded metadata tables.
    #[must_use]
    pub fn tables(&self) -> &MetadataTables {
        &self.tables
    }

    /// The metadata heaps.
    #[must_use]
    pub fn heaps(&self) -> &Heaps {
        &self.heaps
    }

    pub(crate) fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub(crate) fn options(&self) -> &UniverseOptions {
        &self.options
    }

    /// Path of the image file, `None` for images loaded from memory.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// The assembly this module belongs to.
    #[must_use]
    pub fn assembly(&self) -> Option<Arc<AssemblyImage>> {
        self.assembly.get().and_then(Weak::upgrade)
    }

    pub(crate) fn universe(&self) -> Result<Arc<Universe>> {
        self.universe.upgrade().ok_or(Error::Disposed)
    }

    pub(crate) fn arc(&self) -> Result<Arc<ModuleImage>> {
        self.this.upgrade().ok_or(Error::Disposed)
    }

    /// Releases the image bytes. Every later resolution or RVA read fails with
    /// [`Error::Disposed`].
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.file.write() {
            Ok(mut file) => {
                file.take();
            }
            Err(poisoned) => {
                poisoned.into_inner().take();
            }
        }
        tracing::debug!(module = &*self.name, "disposed module");
    }

    /// `true` after [`ModuleImage::dispose`].
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Fails with [`Error::Disposed`] once the module has been disposed.
    ///
    /// # Errors
    /// See above.
    pub fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    /// Copies `len` bytes at `rva` out of the image.
    ///
    /// # Errors
    /// Returns [`Error::Disposed`] after disposal, [`Error::LockError`] for a poisoned lock,
    /// and a format error if the range is not mapped by the image.
    pub fn read_rva_bytes(&self, rva: u32, len: usize) -> Result<Vec<u8>> {
        self.ensure_live()?;
        let file = read_lock!(self.file);
        let Some(file) = file.as_ref() else {
            return Err(Error::Disposed);
        };

        Ok(file.read_rva(rva, len)?.to_vec())
    }

    fn types(&self) -> Result<&TypeTable> {
        if let Some(types) = self.types.get() {
            return Ok(types);
        }

        let table = self.build_type_table()?;
        Ok(self.types.get_or_init(|| table))
    }

    fn build_type_table(&self) -> Result<TypeTable> {
        let count = self.tables.typedef.row_count() as usize;
        let mut names = Vec::with_capacity(count);
        for row in &self.tables.typedef {
            let enclosing = self.tables.enclosing_type(row.rid);
            if enclosing.is_some_and(|outer| outer == 0 || outer as usize > count) {
                return Err(malformed_error!(
                    "TypeDef {} is nested in a type that does not exist",
                    row.rid
                ));
            }
            names.push((
                self.heaps.get_name(row.type_namespace)?,
                self.heaps.get_name(row.type_name)?,
                enclosing,
            ));
        }

        let mut full_names: Vec<Option<String>> = vec![None; count];
        for rid in 1..=count {
            let mut chain = Vec::new();
            let mut current = Some(rid);
            while let Some(index) = current {
                if full_names[index - 1].is_some() {
                    break;
                }
                if chain.contains(&index) || chain.len() > count {
                    return Err(malformed_error!(
                        "NestedClass rows of TypeDef {} form a cycle",
                        index
                    ));
                }
                chain.push(index);
                current = names[index - 1].2.map(|outer| outer as usize);
            }

            for index in chain.into_iter().rev() {
                let (namespace, name, enclosing) = &names[index - 1];
                let full_name = match enclosing {
                    Some(outer) => format!(
                        "{}+{}",
                        full_names[*outer as usize - 1].as_deref().unwrap_or_default(),
                        name
                    ),
                    None if namespace.is_empty() => name.to_string(),
                    None => format!("{namespace}.{name}"),
                };
                full_names[index - 1] = Some(full_name);
            }
        }

        let mut types = Vec::with_capacity(count);
        let mut by_name = HashMap::new();
        for (row, ((namespace, name, enclosing), full_name)) in self
            .tables
            .typedef
            .iter()
            .zip(names.into_iter().zip(full_names))
        {
            if enclosing.is_none() {
                by_name
                    .entry((namespace.to_string(), name.to_string()))
                    .or_insert(TypeEntry::Defined(row.rid));
            }
            types.push(Arc::new(Type::Definition(Arc::new(TypeDefinition::new(
                self.this.clone(),
                row,
                name,
                namespace,
                full_name.unwrap_or_default(),
                enclosing,
            )))));
        }

        for row in &self.tables.exportedtype {
            if matches!(
                row.implementation.tag,
                TableId::AssemblyRef | TableId::File
            ) {
                by_name
                    .entry((
                        self.heaps.get_name(row.type_namespace)?.to_string(),
                        self.heaps.get_name(row.type_name)?.to_string(),
                    ))
                    .or_insert(TypeEntry::Exported(row.rid));
            }
        }

        tracing::debug!(
            module = &*self.name,
            types = types.len(),
            names = by_name.len(),
            "built type table"
        );

        Ok(TypeTable { types, by_name })
    }

    /// The top-level type `namespace.name`, following `ExportedType` forwarders.
    ///
    /// Nested types are reached through [`TypeDefinition::find_nested_type`].
    ///
    /// # Errors
    /// Returns [`Error::Disposed`] after disposal, [`Error::TypeLoad`] if a forwarder's target
    /// does not define the type, and [`Error::RecursionLimit`] for forwarding chains deeper
    /// than `max_forwarding_depth`.
    pub fn find_type(&self, namespace: &str, name: &str) -> Result<Option<TypeRc>> {
        self.find_type_at_depth(namespace, name, 0)
    }

    pub(crate) fn find_type_at_depth(
        &self,
        namespace: &str,
        name: &str,
        depth: usize,
    ) -> Result<Option<TypeRc>> {
        self.ensure_live()?;
        let entry = self
            .types()?
            .by_name
            .get(&(namespace.to_string(), name.to_string()))
            .copied();

        match entry {
            Some(TypeEntry::Defined(rid)) => Ok(Some(self.type_def_rc(rid)?)),
            Some(TypeEntry::Exported(rid)) => self.resolve_exported_type(rid, depth).map(Some),
            None => Ok(None),
        }
    }

    /// All types defined in this module, nested ones included, `<Module>` excluded.
    ///
    /// # Errors
    /// Returns [`Error::Disposed`] after disposal and a format error for bad name indices.
    pub fn get_types(&self) -> Result<Vec<TypeRc>> {
        self.ensure_live()?;
        Ok(self.types()?.types.iter().skip(1).cloned().collect())
    }

    /// The `<Module>` type holding global fields and methods.
    ///
    /// # Errors
    /// See [`ModuleImage::get_types`].
    pub fn module_type(&self) -> Result<Option<TypeRc>> {
        self.ensure_live()?;
        Ok(self.types()?.types.first().cloned())
    }

    /// Identities of all `AssemblyRef` rows.
    ///
    /// # Errors
    /// Returns a format error for bad heap indices.
    pub fn assembly_refs(&self) -> Result<Vec<AssemblyIdentity>> {
        self.tables
            .assemblyref
            .iter()
            .map(|row| AssemblyIdentity::from_assembly_ref(row, &self.heaps))
            .collect()
    }

    /// Names of all `ModuleRef` rows.
    ///
    /// # Errors
    /// Returns a format error for bad heap indices.
    pub fn module_refs(&self) -> Result<Vec<Arc<str>>> {
        self.tables
            .moduleref
            .iter()
            .map(|row| self.heaps.get_name(row.name))
            .collect()
    }

    pub(crate) fn type_def_rc(&self, rid: u32) -> Result<TypeRc> {
        self.ensure_live()?;
        let types = &self.types()?.types;
        rid.checked_sub(1)
            .and_then(|index| types.get(index as usize))
            .cloned()
            .ok_or_else(|| malformed_error!("TypeDef {} does not exist", rid))
    }

    pub(crate) fn type_definition(&self, rid: u32) -> Result<Arc<TypeDefinition>> {
        match self.type_def_rc(rid)?.as_ref() {
            Type::Definition(definition) => Ok(definition.clone()),
            _ => Err(malformed_error!("TypeDef {} is not a definition", rid)),
        }
    }

    pub(crate) fn field_definition(&self, rid: u32) -> Result<Arc<FieldDefinition>> {
        self.cache.fields.get_or_try_init(rid, || {
            let Some(row) = self.tables.field.get(rid) else {
                return Err(malformed_error!("Field {} does not exist", rid));
            };
            Ok(Arc::new(FieldDefinition::new(
                self.this.clone(),
                row,
                self.heaps.get_name(row.name)?,
            )))
        })
    }

    pub(crate) fn method_definition(&self, rid: u32) -> Result<Arc<MethodDefinition>> {
        self.cache.methods.get_or_try_init(rid, || {
            let Some(row) = self.tables.methoddef.get(rid) else {
                return Err(malformed_error!("MethodDef {} does not exist", rid));
            };
            Ok(Arc::new(MethodDefinition::new(
                self.this.clone(),
                row,
                self.heaps.get_name(row.name)?,
            )))
        })
    }

    pub(crate) fn property_definition(&self, rid: u32) -> Result<Arc<PropertyDefinition>> {
        self.cache.properties.get_or_try_init(rid, || {
            let Some(row) = self.tables.property.get(rid) else {
                return Err(malformed_error!("Property {} does not exist", rid));
            };
            Ok(Arc::new(PropertyDefinition::new(
                self.this.clone(),
                row,
                self.heaps.get_name(row.name)?,
            )))
        })
    }

    pub(crate) fn event_definition(&self, rid: u32) -> Result<Arc<EventDefinition>> {
        self.cache.events.get_or_try_init(rid, || {
            let Some(row) = self.tables.event.get(rid) else {
                return Err(malformed_error!("Event {} does not exist", rid));
            };
            Ok(Arc::new(EventDefinition::new(
                self.this.clone(),
                row,
                self.heaps.get_name(row.name)?,
            )))
        })
    }

    pub(crate) fn parameter_definition(&self, rid: u32) -> Result<Arc<ParameterDefinition>> {
        if let Some(parameter) = self.cache.params.get(rid) {
            return Ok(parameter);
        }

        let Some(owner) = self.tables.param_owner(rid) else {
            return Err(malformed_error!("Param {} has no owning method", rid));
        };
        let token = Token::from_parts(TableId::Param, rid);
        self.method_definition(owner)?
            .all_parameters()?
            .into_iter()
            .find(|parameter| parameter.token == token)
            .ok_or_else(|| {
                malformed_error!("Param {} is outside the signature of MethodDef {}", rid, owner)
            })
    }

    pub(crate) fn generic_parameter(&self, rid: u32) -> Result<TypeRc> {
        self.cache.generic_params.get_or_try_init(rid, || {
            let Some(row) = self.tables.genericparam.get(rid) else {
                return Err(malformed_error!("GenericParam {} does not exist", rid));
            };
            Ok(Arc::new(Type::GenericParameter(Arc::new(
                GenericTypeParameter::new(
                    self.this.clone(),
                    row.token,
                    u32::from(row.number),
                    u32::from(row.flags),
                    self.heaps.get_name(row.name)?,
                    row.owner.token,
                ),
            ))))
        })
    }

    pub(crate) fn generic_parameters_of(&self, owner: Token) -> Result<Vec<TypeRc>> {
        self.tables
            .genericparam
            .by_owner(owner)
            .map(|row| self.generic_parameter(row.rid))
            .collect()
    }

    /// `(namespace, name)` of a `TypeDef` or `TypeRef` without resolving it.
    pub(crate) fn type_name_of(&self, token: Token) -> Result<Option<(Arc<str>, Arc<str>)>> {
        match token.table_id() {
            Some(TableId::TypeDef) => match self.tables.typedef.get(token.row()) {
                Some(row) => Ok(Some((
                    self.heaps.get_name(row.type_namespace)?,
                    self.heaps.get_name(row.type_name)?,
                ))),
                None => Err(malformed_error!("TypeDef {} does not exist", token.row())),
            },
            Some(TableId::TypeRef) => match self.tables.typeref.get(token.row()) {
                Some(row) => Ok(Some((
                    self.heaps.get_name(row.type_namespace)?,
                    self.heaps.get_name(row.type_name)?,
                ))),
                None => Err(malformed_error!("TypeRef {} does not exist", token.row())),
            },
            _ => Ok(None),
        }
    }

    pub(crate) fn constant_of(&self, parent: Token) -> Result<Option<ConstantValue>> {
        match self.tables.constant.find_first(parent) {
            Some(row) => Ok(Some(ConstantValue::from_blob(
                row.base,
                &self.heaps.get_blob_copy(row.value)?,
            )?)),
            None => Ok(None),
        }
    }

    pub(crate) fn marshal_descriptor_of(&self, parent: Token) -> Result<Option<Vec<u8>>> {
        match self.tables.fieldmarshal.find_first(parent) {
            Some(row) => Ok(Some(self.heaps.get_blob_copy(row.native_type)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn custom_attributes_of(&self, parent: Token) -> Result<Vec<CustomAttribute>> {
        self.ensure_live()?;
        let table = &self.tables.customattribute;
        let mut attributes = Vec::new();
        for rid in table.find_all_indexed(parent) {
            let Some(row) = table.get(*rid) else {
                continue;
            };
            attributes.push(CustomAttribute {
                owner: parent,
                constructor: self.resolve_method(row.constructor.token, &GenericArguments::none())?,
                value: self.heaps.get_blob_copy(row.value)?,
            });
        }

        Ok(attributes)
    }
}

impl HasCustomAttributes for ModuleImage {
    fn metadata_token(&self) -> Token {
        MODULE_TOKEN
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.arc()
    }
}

impl PartialEq for ModuleImage {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for ModuleImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleImage")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("runtime", &self.root.version)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
