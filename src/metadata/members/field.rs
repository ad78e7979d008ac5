use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        members::{HasCustomAttributes, HasDeclaringType, MemberFlags},
        module::ModuleImage,
        signatures::{SignatureField, SignatureParser},
        tables::{FieldAttributes, FieldRaw},
        token::Token,
        typesystem::{ConstantValue, GenericArguments, TypeRc},
    },
    Error, Result,
};

/// A `Field` row.
pub struct FieldDefinition {
    module: Weak<ModuleImage>,
    /// `Field` token
    pub token: Token,
    /// `FieldAttributes` bitmask
    pub flags: u32,
    /// Field name
    pub name: Arc<str>,
    signature: u32,
    declaring_type: OnceLock<Option<TypeRc>>,
    field_type: OnceLock<TypeRc>,
    member_flags: OnceLock<MemberFlags>,
}

impl FieldDefinition {
    pub(crate) fn new(module: Weak<ModuleImage>, row: &FieldRaw, name: Arc<str>) -> Self {
        FieldDefinition {
            module,
            token: row.token,
            flags: u32::from(row.flags),
            name,
            signature: row.signature,
            declaring_type: OnceLock::new(),
            field_type: OnceLock::new(),
            member_flags: OnceLock::new(),
        }
    }

    /// The defining module.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }

    /// The decoded `FieldSig` blob, with custom modifiers.
    ///
    /// # Errors
    /// Returns a format error for a malformed blob.
    pub fn signature(&self) -> Result<SignatureField> {
        let module = self.module()?;
        SignatureParser::from_parser(module.heaps().get_blob(self.signature)?)
            .parse_field_signature()
    }

    /// The field type, resolved in the context of the declaring type.
    ///
    /// # Errors
    /// Propagates resolution failures of the signature.
    pub fn field_type(&self) -> Result<TypeRc> {
        if let Some(field_type) = self.field_type.get() {
            return Ok(field_type.clone());
        }

        let module = self.module()?;
        let signature = self.signature()?;
        let context = match self.declaring_type()? {
            Some(owner) => match owner.definition() {
                Some(definition) => definition.definition_context()?,
                None => GenericArguments::none(),
            },
            None => GenericArguments::none(),
        };
        let field_type = module.type_from_signature(&signature.base, &context)?;

        Ok(self.field_type.get_or_init(|| field_type).clone())
    }

    /// Visibility and binding, computed once.
    #[must_use]
    pub fn member_flags(&self) -> MemberFlags {
        *self.member_flags.get_or_init(|| {
            MemberFlags::from_access(
                self.flags & FieldAttributes::FIELD_ACCESS_MASK,
                FieldAttributes::PUBLIC,
                FieldAttributes::PRIVATE,
                self.flags & FieldAttributes::STATIC != 0,
            )
        })
    }

    /// `Public` access.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.member_flags().is_public
    }

    /// No instance storage.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.member_flags().is_static
    }

    /// Compile-time constant without storage.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.flags & FieldAttributes::LITERAL != 0
    }

    /// Assignable only in a constructor.
    #[must_use]
    pub fn is_init_only(&self) -> bool {
        self.flags & FieldAttributes::INIT_ONLY != 0
    }

    /// The default value from the `Constant` table.
    ///
    /// # Errors
    /// Returns a format error for a malformed constant blob.
    pub fn constant(&self) -> Result<Option<ConstantValue>> {
        self.module()?.constant_of(self.token)
    }

    /// Explicit byte offset from `FieldLayout`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn offset(&self) -> Result<Option<u32>> {
        let module = self.module()?;
        Ok(module
            .tables()
            .fieldlayout
            .find_first(self.token)
            .map(|row| row.field_offset))
    }

    /// RVA of the initial data from `FieldRVA`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn rva(&self) -> Result<Option<u32>> {
        let module = self.module()?;
        Ok(module
            .tables()
            .fieldrva
            .find_first(self.token)
            .map(|row| row.rva))
    }

    /// `len` bytes of initial data at the field's RVA.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the field has no RVA, and the failures of
    /// [`ModuleImage::read_rva_bytes`].
    pub fn initial_data(&self, len: usize) -> Result<Vec<u8>> {
        let Some(rva) = self.rva()? else {
            return Err(malformed_error!("Field {} has no RVA", self.name));
        };
        self.module()?.read_rva_bytes(rva, len)
    }

    /// The raw `NativeType` marshalling descriptor from `FieldMarshal`.
    ///
    /// # Errors
    /// Returns a format error for a bad blob index.
    pub fn marshal_descriptor(&self) -> Result<Option<Vec<u8>>> {
        self.module()?.marshal_descriptor_of(self.token)
    }
}

impl HasDeclaringType for FieldDefinition {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        if let Some(owner) = self.declaring_type.get() {
            return Ok(owner.clone());
        }

        let module = self.module()?;
        let owner = match module.tables().field_owner(self.token.row()) {
            Some(rid) => Some(module.type_def_rc(rid)?),
            None => None,
        };

        Ok(self.declaring_type.get_or_init(|| owner).clone())
    }
}

impl HasCustomAttributes for FieldDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for FieldDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for FieldDefinition {}

impl Hash for FieldDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("flags", &format_args!("{:#x}", self.flags))
            .finish()
    }
}

/// A field of a generic type definition seen through an instantiation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundField {
    /// The field row
    pub definition: Arc<FieldDefinition>,
    /// The instantiated declaring type
    pub declaring_type: TypeRc,
    /// Field type with the instance's arguments substituted
    pub field_type: TypeRc,
}

/// Stand-in for a field reference that did not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MissingField {
    /// The type the field was looked up on
    pub owner: TypeRc,
    /// The referenced name
    pub name: String,
    /// The referenced field type
    pub field_type: TypeRc,
}
