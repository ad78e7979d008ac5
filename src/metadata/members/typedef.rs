use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        members::{
            EventDefinition, FieldDefinition, HasCustomAttributes, HasDeclaringType,
            HasGenericParameters, Method, MethodDefinition, PropertyDefinition,
        },
        module::ModuleImage,
        tables::{CodedIndex, TypeAttributes, TypeDefRaw},
        token::Token,
        typesystem::{GenericArguments, TypeRc},
    },
    Error, Result,
};

/// Explicit layout information from the `ClassLayout` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassLayout {
    /// Field alignment in bytes, 0 for the default
    pub packing_size: u16,
    /// Total size of the type in bytes, 0 if unspecified
    pub class_size: u32,
}

/// A `TypeDef` row.
///
/// Names and flags are read when the module builds its type table; everything else is
/// resolved on first access and kept for the lifetime of the module.
pub struct TypeDefinition {
    module: Weak<ModuleImage>,
    /// `TypeDef` token
    pub token: Token,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Simple name
    pub name: Arc<str>,
    /// Namespace, empty for nested types
    pub namespace: Arc<str>,
    full_name: String,
    extends: CodedIndex,
    enclosing: Option<u32>,
    base: OnceLock<Option<TypeRc>>,
    generic_params: OnceLock<Vec<TypeRc>>,
    interfaces: OnceLock<Vec<TypeRc>>,
    fields: OnceLock<Vec<Arc<FieldDefinition>>>,
    methods: OnceLock<Vec<Arc<MethodDefinition>>>,
}

impl TypeDefinition {
    pub(crate) fn new(
        module: Weak<ModuleImage>,
        row: &TypeDefRaw,
        name: Arc<str>,
        namespace: Arc<str>,
        full_name: String,
        enclosing: Option<u32>,
    ) -> Self {
        TypeDefinition {
            module,
            token: row.token,
            flags: row.flags,
            name,
            namespace,
            full_name,
            extends: row.extends,
            enclosing,
            base: OnceLock::new(),
            generic_params: OnceLock::new(),
            interfaces: OnceLock::new(),
            fields: OnceLock::new(),
            methods: OnceLock::new(),
        }
    }

    /// The defining module.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }

    /// `Namespace.Name`, or `Outer+Inner` for nested types.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The 1-based `TypeDef` row.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.token.row()
    }

    /// `true` for row 1, the `<Module>` type holding global fields and methods.
    #[must_use]
    pub fn is_module_type(&self) -> bool {
        self.token.row() == 1
    }

    /// `true` if nested in another type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    /// `Public` or `NestedPublic` visibility.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self.flags & TypeAttributes::VISIBILITY_MASK,
            TypeAttributes::PUBLIC | TypeAttributes::NESTED_PUBLIC
        )
    }

    /// Interface semantics.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags & TypeAttributes::INTERFACE != 0
    }

    /// Abstract class or interface.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & TypeAttributes::ABSTRACT != 0
    }

    /// No derived types allowed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.flags & TypeAttributes::SEALED != 0
    }

    /// The generic context of the definition itself: `!n` is the type's own parameter `n`.
    ///
    /// # Errors
    /// See [`HasGenericParameters::generic_parameters`].
    pub fn definition_context(&self) -> Result<GenericArguments> {
        Ok(GenericArguments::new(self.generic_parameters()?, Vec::new()))
    }

    /// The type named by the `extends` column, `None` for interfaces and `System.Object`.
    ///
    /// # Errors
    /// Propagates resolution failures of the base type.
    pub fn base_type(&self) -> Result<Option<TypeRc>> {
        if let Some(base) = self.base.get() {
            return Ok(base.clone());
        }

        let base = if self.extends.is_null() {
            None
        } else {
            let context = self.definition_context()?;
            Some(self.module()?.resolve_type(self.extends.token, &context)?)
        };

        Ok(self.base.get_or_init(|| base).clone())
    }

    /// `true` if the type derives from `System.ValueType` or is an enum.
    ///
    /// Decided from the names in the `extends` column, so the core library does not need to be
    /// loaded.
    ///
    /// # Errors
    /// Propagates heap read failures.
    pub fn is_value_type(&self) -> Result<bool> {
        match self.base_type_name()? {
            Some((namespace, name)) if &*namespace == "System" => Ok(&*name == "Enum"
                || (&*name == "ValueType"
                    && !(&*self.namespace == "System" && &*self.name == "Enum"))),
            _ => Ok(false),
        }
    }

    /// `true` if the type derives from `System.Enum`.
    ///
    /// # Errors
    /// Propagates heap read failures.
    pub fn is_enum(&self) -> Result<bool> {
        Ok(matches!(
            self.base_type_name()?,
            Some((namespace, name)) if &*namespace == "System" && &*name == "Enum"
        ))
    }

    fn base_type_name(&self) -> Result<Option<(Arc<str>, Arc<str>)>> {
        if self.extends.is_null() {
            return Ok(None);
        }
        self.module()?.type_name_of(self.extends.token)
    }

    /// Fields in declaration order.
    ///
    /// # Errors
    /// Propagates failures reading the field rows.
    pub fn fields(&self) -> Result<Vec<Arc<FieldDefinition>>> {
        if let Some(fields) = self.fields.get() {
            return Ok(fields.clone());
        }

        let module = self.module()?;
        let fields = module
            .tables()
            .type_fields(self.rid())?
            .into_iter()
            .map(|rid| module.field_definition(rid))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.fields.get_or_init(|| fields).clone())
    }

    /// Methods in declaration order.
    ///
    /// # Errors
    /// Propagates failures reading the method rows.
    pub fn methods(&self) -> Result<Vec<Arc<MethodDefinition>>> {
        if let Some(methods) = self.methods.get() {
            return Ok(methods.clone());
        }

        let module = self.module()?;
        let methods = module
            .tables()
            .type_methods(self.rid())?
            .into_iter()
            .map(|rid| module.method_definition(rid))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.methods.get_or_init(|| methods).clone())
    }

    /// Properties owned through `PropertyMap`.
    ///
    /// # Errors
    /// Propagates failures reading the property rows.
    pub fn properties(&self) -> Result<Vec<Arc<PropertyDefinition>>> {
        let module = self.module()?;
        module
            .tables()
            .type_properties(self.rid())?
            .into_iter()
            .map(|rid| module.property_definition(rid))
            .collect()
    }

    /// Events owned through `EventMap`.
    ///
    /// # Errors
    /// Propagates failures reading the event rows.
    pub fn events(&self) -> Result<Vec<Arc<EventDefinition>>> {
        let module = self.module()?;
        module
            .tables()
            .type_events(self.rid())?
            .into_iter()
            .map(|rid| module.event_definition(rid))
            .collect()
    }

    /// The declared field named `name`.
    ///
    /// # Errors
    /// See [`TypeDefinition::fields`].
    pub fn field(&self, name: &str) -> Result<Option<Arc<FieldDefinition>>> {
        Ok(self
            .fields()?
            .into_iter()
            .find(|field| &*field.name == name))
    }

    /// Declared methods named `name`.
    ///
    /// # Errors
    /// See [`TypeDefinition::methods`].
    pub fn methods_named(&self, name: &str) -> Result<Vec<Arc<MethodDefinition>>> {
        Ok(self
            .methods()?
            .into_iter()
            .filter(|method| &*method.name == name)
            .collect())
    }

    /// Interfaces listed in `InterfaceImpl`, resolved in the definition's context.
    ///
    /// # Errors
    /// Propagates resolution failures of the interface types.
    pub fn interfaces(&self) -> Result<Vec<TypeRc>> {
        if let Some(interfaces) = self.interfaces.get() {
            return Ok(interfaces.clone());
        }

        let module = self.module()?;
        let context = self.definition_context()?;
        let table = &module.tables().interfaceimpl;
        let mut interfaces = Vec::new();
        for rid in table.find_all(self.token) {
            if let Some(row) = table.get(rid) {
                interfaces.push(module.resolve_type(row.interface.token, &context)?);
            }
        }

        Ok(self.interfaces.get_or_init(|| interfaces).clone())
    }

    /// `(body, declaration)` pairs from `MethodImpl`: explicit overrides and interface
    /// implementations.
    ///
    /// # Errors
    /// Propagates resolution failures of either method.
    pub fn method_impls(&self) -> Result<Vec<(Method, Method)>> {
        let module = self.module()?;
        let context = self.definition_context()?;
        let table = &module.tables().methodimpl;
        table
            .find_all(self.token)
            .filter_map(|rid| table.get(rid))
            .map(|row| {
                Ok((
                    module.resolve_method(row.method_body.token, &context)?,
                    module.resolve_method(row.method_declaration.token, &context)?,
                ))
            })
            .collect()
    }

    /// Types nested directly in this one.
    ///
    /// # Errors
    /// Propagates failures building the module's type table.
    pub fn nested_types(&self) -> Result<Vec<TypeRc>> {
        let module = self.module()?;
        module
            .tables()
            .nested_types(self.rid())
            .into_iter()
            .map(|rid| module.type_def_rc(rid))
            .collect()
    }

    /// The nested type named `name`.
    ///
    /// # Errors
    /// See [`TypeDefinition::nested_types`].
    pub fn find_nested_type(&self, name: &str) -> Result<Option<TypeRc>> {
        Ok(self.nested_types()?.into_iter().find(|nested| {
            nested
                .definition()
                .is_some_and(|definition| &*definition.name == name)
        }))
    }

    /// Packing and size from `ClassLayout`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn class_layout(&self) -> Result<Option<ClassLayout>> {
        let module = self.module()?;
        Ok(module
            .tables()
            .classlayout
            .find_first(self.token)
            .map(|row| ClassLayout {
                packing_size: row.packing_size,
                class_size: row.class_size,
            }))
    }
}

impl HasDeclaringType for TypeDefinition {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        match self.enclosing {
            Some(rid) => Ok(Some(self.module()?.type_def_rc(rid)?)),
            None => Ok(None),
        }
    }
}

impl HasGenericParameters for TypeDefinition {
    fn generic_parameters(&self) -> Result<Vec<TypeRc>> {
        if let Some(params) = self.generic_params.get() {
            return Ok(params.clone());
        }

        let params = self.module()?.generic_parameters_of(self.token)?;
        Ok(self.generic_params.get_or_init(|| params).clone())
    }
}

impl HasCustomAttributes for TypeDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for TypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for TypeDefinition {}

impl Hash for TypeDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("token", &self.token)
            .field("full_name", &self.full_name)
            .field("flags", &format_args!("{:#x}", self.flags))
            .finish()
    }
}
