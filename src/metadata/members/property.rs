use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        members::{HasCustomAttributes, HasDeclaringType, MemberFlags, MethodDefinition},
        module::ModuleImage,
        signatures::{SignatureParser, SignatureProperty},
        tables::{EventRaw, MethodSemanticsAttributes, PropertyAttributes, PropertyRaw},
        token::Token,
        typesystem::{ConstantValue, GenericArguments, TypeRc},
    },
    Error, Result,
};

/// Accessor methods linked to a property or event through `MethodSemantics`.
#[derive(Clone, Debug, Default)]
struct Accessors {
    methods: Vec<(u32, Arc<MethodDefinition>)>,
}

impl Accessors {
    fn load(module: &ModuleImage, association: Token) -> Result<Self> {
        let table = &module.tables().methodsemantics;
        let mut methods = Vec::new();
        for rid in table.find_all_indexed(association) {
            let Some(row) = table.get(*rid) else {
                continue;
            };
            methods.push((u32::from(row.semantics), module.method_definition(row.method)?));
        }

        Ok(Accessors { methods })
    }

    fn first(&self, semantics: u32) -> Option<Arc<MethodDefinition>> {
        self.methods
            .iter()
            .find(|(kind, _)| kind & semantics != 0)
            .map(|(_, method)| method.clone())
    }

    fn all(&self, semantics: u32) -> Vec<Arc<MethodDefinition>> {
        self.methods
            .iter()
            .filter(|(kind, _)| kind & semantics != 0)
            .map(|(_, method)| method.clone())
            .collect()
    }

    fn member_flags(&self) -> MemberFlags {
        self.methods
            .iter()
            .map(|(_, method)| method.member_flags())
            .reduce(MemberFlags::union)
            .unwrap_or_default()
    }
}

fn owner_context(owner: Option<&TypeRc>) -> Result<GenericArguments> {
    match owner.and_then(|owner| owner.definition()) {
        Some(definition) => definition.definition_context(),
        None => Ok(GenericArguments::none()),
    }
}

/// A `Property` row.
pub struct PropertyDefinition {
    module: Weak<ModuleImage>,
    /// `Property` token
    pub token: Token,
    /// `PropertyAttributes` bitmask
    pub flags: u32,
    /// Property name
    pub name: Arc<str>,
    signature: u32,
    declaring_type: OnceLock<Option<TypeRc>>,
    property_type: OnceLock<TypeRc>,
    accessors: OnceLock<Accessors>,
}

impl PropertyDefinition {
    pub(crate) fn new(module: Weak<ModuleImage>, row: &PropertyRaw, name: Arc<str>) -> Self {
        PropertyDefinition {
            module,
            token: row.token,
            flags: u32::from(row.flags),
            name,
            signature: row.signature,
            declaring_type: OnceLock::new(),
            property_type: OnceLock::new(),
            accessors: OnceLock::new(),
        }
    }

    /// The defining module.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }

    /// The decoded `PropertySig` blob.
    ///
    /// # Errors
    /// Returns a format error for a malformed blob.
    pub fn signature(&self) -> Result<SignatureProperty> {
        let module = self.module()?;
        SignatureParser::from_parser(module.heaps().get_blob(self.signature)?)
            .parse_property_signature()
    }

    /// The property type in the context of the declaring type.
    ///
    /// # Errors
    /// Propagates resolution failures of the signature.
    pub fn property_type(&self) -> Result<TypeRc> {
        if let Some(property_type) = self.property_type.get() {
            return Ok(property_type.clone());
        }

        let module = self.module()?;
        let context = owner_context(self.declaring_type()?.as_ref())?;
        let property_type = module.type_from_signature(&self.signature()?.base, &context)?;

        Ok(self.property_type.get_or_init(|| property_type).clone())
    }

    /// Index parameter types, empty for non-indexed properties.
    ///
    /// # Errors
    /// Propagates resolution failures of the signature.
    pub fn index_parameters(&self) -> Result<Vec<TypeRc>> {
        let module = self.module()?;
        let context = owner_context(self.declaring_type()?.as_ref())?;
        self.signature()?
            .params
            .iter()
            .map(|param| module.parameter_type(param, &context))
            .collect()
    }

    fn accessors(&self) -> Result<&Accessors> {
        if let Some(accessors) = self.accessors.get() {
            return Ok(accessors);
        }

        let module = self.module()?;
        let accessors = Accessors::load(&module, self.token)?;
        Ok(self.accessors.get_or_init(|| accessors))
    }

    /// The `get` accessor.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn getter(&self) -> Result<Option<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.first(MethodSemanticsAttributes::GETTER))
    }

    /// The `set` accessor.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn setter(&self) -> Result<Option<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.first(MethodSemanticsAttributes::SETTER))
    }

    /// Accessors with `Other` semantics.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn other_methods(&self) -> Result<Vec<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.all(MethodSemanticsAttributes::OTHER))
    }

    /// The default value from the `Constant` table.
    ///
    /// # Errors
    /// Returns a format error for a malformed constant blob.
    pub fn default_value(&self) -> Result<Option<ConstantValue>> {
        if self.flags & PropertyAttributes::HAS_DEFAULT == 0 {
            return Ok(None);
        }
        self.module()?.constant_of(self.token)
    }

    /// The union of the accessors' visibility and binding.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn member_flags(&self) -> Result<MemberFlags> {
        Ok(self.accessors()?.member_flags())
    }
}

impl HasDeclaringType for PropertyDefinition {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        if let Some(owner) = self.declaring_type.get() {
            return Ok(owner.clone());
        }

        let module = self.module()?;
        let owner = match module.tables().property_owner(self.token.row()) {
            Some(rid) => Some(module.type_def_rc(rid)?),
            None => None,
        };

        Ok(self.declaring_type.get_or_init(|| owner).clone())
    }
}

impl HasCustomAttributes for PropertyDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for PropertyDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for PropertyDefinition {}

impl Hash for PropertyDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("token", &self.token)
            .field("name", &self.name)
            .finish()
    }
}

/// An `Event` row.
pub struct EventDefinition {
    module: Weak<ModuleImage>,
    /// `Event` token
    pub token: Token,
    /// `EventAttributes` bitmask
    pub flags: u32,
    /// Event name
    pub name: Arc<str>,
    event_type: Token,
    declaring_type: OnceLock<Option<TypeRc>>,
    accessors: OnceLock<Accessors>,
}

impl EventDefinition {
    pub(crate) fn new(module: Weak<ModuleImage>, row: &EventRaw, name: Arc<str>) -> Self {
        EventDefinition {
            module,
            token: row.token,
            flags: u32::from(row.flags),
            name,
            event_type: row.event_type.token,
            declaring_type: OnceLock::new(),
            accessors: OnceLock::new(),
        }
    }

    /// The defining module.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }

    /// The delegate type, `None` if the row leaves it null.
    ///
    /// # Errors
    /// Propagates resolution failures of the type.
    pub fn event_type(&self) -> Result<Option<TypeRc>> {
        if self.event_type.is_null() {
            return Ok(None);
        }

        let module = self.module()?;
        let context = owner_context(self.declaring_type()?.as_ref())?;
        Ok(Some(module.resolve_type(self.event_type, &context)?))
    }

    fn accessors(&self) -> Result<&Accessors> {
        if let Some(accessors) = self.accessors.get() {
            return Ok(accessors);
        }

        let module = self.module()?;
        let accessors = Accessors::load(&module, self.token)?;
        Ok(self.accessors.get_or_init(|| accessors))
    }

    /// The `add` accessor.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn add_method(&self) -> Result<Option<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.first(MethodSemanticsAttributes::ADD_ON))
    }

    /// The `remove` accessor.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn remove_method(&self) -> Result<Option<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.first(MethodSemanticsAttributes::REMOVE_ON))
    }

    /// The `raise` accessor.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn raise_method(&self) -> Result<Option<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.first(MethodSemanticsAttributes::FIRE))
    }

    /// Accessors with `Other` semantics.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn other_methods(&self) -> Result<Vec<Arc<MethodDefinition>>> {
        Ok(self.accessors()?.all(MethodSemanticsAttributes::OTHER))
    }

    /// The union of the accessors' visibility and binding.
    ///
    /// # Errors
    /// Propagates failures reading the `MethodSemantics` rows.
    pub fn member_flags(&self) -> Result<MemberFlags> {
        Ok(self.accessors()?.member_flags())
    }
}

impl HasDeclaringType for EventDefinition {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        if let Some(owner) = self.declaring_type.get() {
            return Ok(owner.clone());
        }

        let module = self.module()?;
        let owner = match module.tables().event_owner(self.token.row()) {
            Some(rid) => Some(module.type_def_rc(rid)?),
            None => None,
        };

        Ok(self.declaring_type.get_or_init(|| owner).clone())
    }
}

impl HasCustomAttributes for EventDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for EventDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for EventDefinition {}

impl Hash for EventDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for EventDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDefinition")
            .field("token", &self.token)
            .field("name", &self.name)
            .finish()
    }
}
