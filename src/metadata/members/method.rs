use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        members::{HasCustomAttributes, HasDeclaringType, HasGenericParameters, MemberFlags},
        module::ModuleImage,
        signatures::{SignatureMethod, SignatureParser},
        tables::{MethodAttributes, MethodDefRaw, ParamAttributes},
        token::Token,
        typesystem::{ConstantValue, GenericArguments, MethodSig, TypeRc},
    },
    Error, Result,
};

/// A `MethodDef` row.
pub struct MethodDefinition {
    module: Weak<ModuleImage>,
    /// `MethodDef` token
    pub token: Token,
    /// RVA of the method body, 0 for abstract and runtime-provided methods
    pub rva: u32,
    /// `MethodImplAttributes` bitmask
    pub impl_flags: u32,
    /// `MethodAttributes` bitmask
    pub flags: u32,
    /// Method name
    pub name: Arc<str>,
    signature: u32,
    declaring_type: OnceLock<Option<TypeRc>>,
    generic_params: OnceLock<Vec<TypeRc>>,
    resolved: OnceLock<Arc<MethodSig>>,
    parameters: OnceLock<Vec<Arc<ParameterDefinition>>>,
    member_flags: OnceLock<MemberFlags>,
}

impl MethodDefinition {
    pub(crate) fn new(module: Weak<ModuleImage>, row: &MethodDefRaw, name: Arc<str>) -> Self {
        MethodDefinition {
            module,
            token: row.token,
            rva: row.rva,
            impl_flags: u32::from(row.impl_flags),
            flags: u32::from(row.flags),
            name,
            signature: row.signature,
            declaring_type: OnceLock::new(),
            generic_params: OnceLock::new(),
            resolved: OnceLock::new(),
            parameters: OnceLock::new(),
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

    /// The decoded `MethodDefSig` blob.
    ///
    /// # Errors
    /// Returns a format error for a malformed blob.
    pub fn raw_signature(&self) -> Result<SignatureMethod> {
        let module = self.module()?;
        SignatureParser::from_parser(module.heaps().get_blob(self.signature)?)
            .parse_method_signature()
    }

    /// The generic context of the definition: the declaring type's parameters for `!n` and
    /// the method's own for `!!n`.
    ///
    /// # Errors
    /// Propagates failures reading the generic parameters.
    pub fn definition_context(&self) -> Result<GenericArguments> {
        let type_args = match self.declaring_type()? {
            Some(owner) => match owner.definition() {
                Some(definition) => definition.generic_parameters()?,
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        Ok(GenericArguments::new(type_args, self.generic_parameters()?))
    }

    /// The signature with all types resolved in the definition context.
    ///
    /// # Errors
    /// Propagates resolution failures of the signature types.
    pub fn signature(&self) -> Result<Arc<MethodSig>> {
        if let Some(signature) = self.resolved.get() {
            return Ok(signature.clone());
        }

        let module = self.module()?;
        let context = self.definition_context()?;
        let signature = Arc::new(module.method_sig_from(&self.raw_signature()?, &context)?);

        Ok(self.resolved.get_or_init(|| signature).clone())
    }

    /// Visibility and binding, computed once.
    #[must_use]
    pub fn member_flags(&self) -> MemberFlags {
        *self.member_flags.get_or_init(|| {
            MemberFlags::from_access(
                self.flags & MethodAttributes::MEMBER_ACCESS_MASK,
                MethodAttributes::PUBLIC,
                MethodAttributes::PRIVATE,
                self.flags & MethodAttributes::STATIC != 0,
            )
        })
    }

    /// `Public` access.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.member_flags().is_public
    }

    /// No `this` parameter.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.member_flags().is_static
    }

    /// Takes part in virtual dispatch.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags & MethodAttributes::VIRTUAL != 0
    }

    /// No implementation.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & MethodAttributes::ABSTRACT != 0
    }

    /// `.ctor` or `.cctor` with the runtime special name flag.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.flags & MethodAttributes::RT_SPECIAL_NAME != 0
            && matches!(&*self.name, ".ctor" | ".cctor")
    }

    /// Parameters in position order, without the return parameter.
    ///
    /// Every signature parameter is present. Parameters without a `Param` row have no name
    /// and a null token.
    ///
    /// # Errors
    /// Propagates failures resolving the signature or reading the `Param` rows.
    pub fn parameters(&self) -> Result<Vec<Arc<ParameterDefinition>>> {
        Ok(self.all_parameters()?.into_iter().skip(1).collect())
    }

    /// The return parameter (sequence 0).
    ///
    /// # Errors
    /// See [`MethodDefinition::parameters`].
    pub fn return_parameter(&self) -> Result<Arc<ParameterDefinition>> {
        self.all_parameters()?
            .into_iter()
            .next()
            .ok_or_else(|| malformed_error!("Method {} has no return parameter", self.name))
    }

    pub(crate) fn all_parameters(&self) -> Result<Vec<Arc<ParameterDefinition>>> {
        if let Some(parameters) = self.parameters.get() {
            return Ok(parameters.clone());
        }

        let module = self.module()?;
        let signature = self.signature()?;
        let rows = module.tables().method_params(self.token.row())?;

        let types = std::iter::once(&signature.return_type).chain(signature.params.iter());
        let mut parameters = Vec::with_capacity(signature.params.len() + 1);
        for (sequence, parameter_type) in types.enumerate() {
            let sequence = sequence as u32;
            let row = rows.iter().copied().find(|rid| {
                module
                    .tables()
                    .param
                    .get(*rid)
                    .is_some_and(|row| u32::from(row.sequence) == sequence)
            });

            let parameter = match row {
                Some(rid) => module.cache().params.get_or_try_init(rid, || {
                    let Some(row) = module.tables().param.get(rid) else {
                        return Err(out_of_bounds_error!());
                    };
                    Ok(Arc::new(ParameterDefinition {
                        module: self.module.clone(),
                        token: row.token,
                        sequence,
                        name: module.heaps().get_string(row.name)?,
                        flags: u32::from(row.flags),
                        parameter_type: parameter_type.clone(),
                        method: self.token,
                    }))
                })?,
                None => Arc::new(ParameterDefinition {
                    module: self.module.clone(),
                    token: Token::new(0),
                    sequence,
                    name: None,
                    flags: 0,
                    parameter_type: parameter_type.clone(),
                    method: self.token,
                }),
            };
            parameters.push(parameter);
        }

        Ok(self.parameters.get_or_init(|| parameters).clone())
    }

    /// The platform invoke import from `ImplMap`.
    ///
    /// # Errors
    /// Returns a format error for bad heap or `ModuleRef` indices.
    pub fn pinvoke(&self) -> Result<Option<PInvokeInfo>> {
        let module = self.module()?;
        let Some(row) = module.tables().implmap.find_first(self.token) else {
            return Ok(None);
        };

        let Some(scope) = module.tables().moduleref.get(row.import_scope) else {
            return Err(malformed_error!(
                "ImplMap of {} names ModuleRef {} which does not exist",
                self.name,
                row.import_scope
            ));
        };

        Ok(Some(PInvokeInfo {
            entry_point: module.heaps().get_name(row.import_name)?,
            module_name: module.heaps().get_name(scope.name)?,
            flags: u32::from(row.mapping_flags),
        }))
    }
}

impl HasDeclaringType for MethodDefinition {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        if let Some(owner) = self.declaring_type.get() {
            return Ok(owner.clone());
        }

        let module = self.module()?;
        let owner = match module.tables().method_owner(self.token.row()) {
            Some(rid) => Some(module.type_def_rc(rid)?),
            None => None,
        };

        Ok(self.declaring_type.get_or_init(|| owner).clone())
    }
}

impl HasGenericParameters for MethodDefinition {
    fn generic_parameters(&self) -> Result<Vec<TypeRc>> {
        if let Some(params) = self.generic_params.get() {
            return Ok(params.clone());
        }

        let params = self.module()?.generic_parameters_of(self.token)?;
        Ok(self.generic_params.get_or_init(|| params).clone())
    }
}

impl HasCustomAttributes for MethodDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for MethodDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for MethodDefinition {}

impl Hash for MethodDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("flags", &format_args!("{:#x}", self.flags))
            .field("rva", &format_args!("{:#x}", self.rva))
            .finish()
    }
}

/// Target of a platform invoke method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PInvokeInfo {
    /// Exported function name
    pub entry_point: Arc<str>,
    /// Native module name from `ModuleRef`
    pub module_name: Arc<str>,
    /// `PInvokeAttributes` bitmask
    pub flags: u32,
}

/// A method parameter, or the return parameter at sequence 0.
pub struct ParameterDefinition {
    module: Weak<ModuleImage>,
    /// `Param` token, null if the parameter has no row
    pub token: Token,
    /// 0 for the return value, 1.. for parameters
    pub sequence: u32,
    /// Parameter name
    pub name: Option<Arc<str>>,
    /// `ParamAttributes` bitmask
    pub flags: u32,
    /// Type from the method signature
    pub parameter_type: TypeRc,
    /// The owning `MethodDef`
    pub method: Token,
}

impl ParameterDefinition {
    /// Marshalled into the callee.
    #[must_use]
    pub fn is_in(&self) -> bool {
        self.flags & ParamAttributes::IN != 0
    }

    /// Marshalled back to the caller.
    #[must_use]
    pub fn is_out(&self) -> bool {
        self.flags & ParamAttributes::OUT != 0
    }

    /// May be omitted by callers.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.flags & ParamAttributes::OPTIONAL != 0
    }

    /// The default value from the `Constant` table.
    ///
    /// # Errors
    /// Returns a format error for a malformed constant blob.
    pub fn default_value(&self) -> Result<Option<ConstantValue>> {
        if self.token.is_null() {
            return Ok(None);
        }
        self.owning_module()?.constant_of(self.token)
    }
}

impl HasCustomAttributes for ParameterDefinition {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }
}

impl PartialEq for ParameterDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.sequence == other.sequence
            && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl fmt::Debug for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDefinition")
            .field("token", &self.token)
            .field("sequence", &self.sequence)
            .field("name", &self.name)
            .field("parameter_type", &self.parameter_type)
            .finish()
    }
}

/// A method definition seen through a generic type instance, or instantiated with method
/// type arguments by a `MethodSpec`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundMethod {
    /// The method row
    pub definition: Arc<MethodDefinition>,
    /// The declaring type, instantiated if generic
    pub declaring_type: TypeRc,
    /// Method type arguments, empty unless instantiated by a `MethodSpec`
    pub method_args: Vec<TypeRc>,
    /// Signature with all known arguments substituted
    pub signature: Arc<MethodSig>,
}

/// The runtime-provided methods of multi-dimensional arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayMethodKind {
    /// `Get(indices)`
    Get,
    /// `Set(indices, value)`
    Set,
    /// `Address(indices)`
    Address,
    /// `.ctor(lengths)` or `.ctor(lower bounds and lengths)`
    Constructor,
}

impl ArrayMethodKind {
    /// Maps a referenced name to the method kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Get" => Some(ArrayMethodKind::Get),
            "Set" => Some(ArrayMethodKind::Set),
            "Address" => Some(ArrayMethodKind::Address),
            ".ctor" => Some(ArrayMethodKind::Constructor),
            _ => None,
        }
    }
}

/// A method of a multi-dimensional array type, synthesized from the referencing `MemberRef`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayMethod {
    /// The array type
    pub declaring_type: TypeRc,
    /// Which of the array methods this is
    pub kind: ArrayMethodKind,
    /// The referenced name
    pub name: Arc<str>,
    /// The referenced signature
    pub signature: Arc<MethodSig>,
}

/// Stand-in for a method reference that did not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MissingMethod {
    /// The type the method was looked up on
    pub owner: TypeRc,
    /// The referenced name
    pub name: String,
    /// The referenced signature
    pub signature: Arc<MethodSig>,
}
