//! Token resolution: dispatch on the table tag, scopes of type references, member reference
//! matching and generic instantiation.
//!
//! Results that do not depend on the caller's generic context are cached per row. A
//! [`TrackingGenericContext`] records whether a `TypeSpec`, `MemberRef` or `MethodSpec` consulted
//! the context; if it did, the result belongs to that caller only and is not cached.

use std::{collections::HashSet, sync::Arc};

use crate::{
    metadata::{
        assembly::AssemblyImage,
        cache::RowCache,
        identity::AssemblyIdentity,
        members::{
            ArrayMethod, ArrayMethodKind, BoundMethod, Entity, Field, HasDeclaringType,
            HasGenericParameters, Method, MissingField, MissingMethod,
        },
        module::ModuleImage,
        signatures::{
            is_field_signature, SignatureMethod, SignatureParameter, SignatureParser,
            TypeSignature,
        },
        tables::{CodedIndex, MemberRefRaw, TableId},
        token::Token,
        typesystem::{
            ArrayType, GenericArguments, GenericContext, GenericInstance, MethodSig, MissingType,
            PrimitiveKind, TrackingGenericContext, Type, TypeRc,
        },
    },
    Error, Result,
};

/// Bound on `TypeRef` scope chains, which only nest as deep as nested types do.
const MAX_TYPE_REF_DEPTH: usize = 64;

/// What the `Class` column of a `MemberRef` resolves to.
enum MemberParent {
    Type(TypeRc),
    Method(Method),
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// Serves `rid` from `cache`, or computes it through a tracking wrapper of `context` and caches
/// the result unless the context was consulted.
fn cached_with_context<T, F>(
    cache: &RowCache<T>,
    rid: u32,
    context: &dyn GenericContext,
    factory: F,
) -> Result<T>
where
    T: Clone,
    F: FnOnce(&dyn GenericContext) -> Result<T>,
{
    if let Some(value) = cache.get(rid) {
        return Ok(value);
    }

    let tracker = TrackingGenericContext::new(context);
    let value = factory(&tracker)?;
    if tracker.is_used() {
        tracing::trace!(rid, "result depends on the generic context, not cached");
        Ok(value)
    } else {
        cache.get_or_try_init(rid, || Ok(value))
    }
}

impl ModuleImage {
    /// Resolves `token` to the entity it names, without generic context.
    ///
    /// # Errors
    /// Returns [`Error::Disposed`] after disposal, a format error for tokens that name no
    /// entity or rows that do not exist, and the resolution errors of the entity kind.
    pub fn resolve_token(&self, token: Token) -> Result<Entity> {
        self.resolve_token_with(token, &GenericArguments::none())
    }

    /// Resolves `token` with `context` supplying the types of `!n` and `!!n`.
    ///
    /// # Errors
    /// See [`ModuleImage::resolve_token`].
    pub fn resolve_token_with(&self, token: Token, context: &dyn GenericContext) -> Result<Entity> {
        self.ensure_live()?;
        if token.is_user_string() {
            return Ok(Entity::UserString(self.resolve_string(token)?));
        }

        let Some(table) = token.table_id() else {
            return Err(malformed_error!("Token {} names no metadata table", token));
        };
        let rid = token.row();

        match table {
            TableId::Module if rid == 1 => Ok(Entity::Module(self.arc()?)),
            TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec => {
                Ok(Entity::Type(self.resolve_type(token, context)?))
            }
            TableId::Field => Ok(Entity::Field(self.resolve_field(token, context)?)),
            TableId::MethodDef | TableId::MethodSpec => {
                Ok(Entity::Method(self.resolve_method(token, context)?))
            }
            TableId::MemberRef => {
                if self.member_ref_is_field(rid)? {
                    Ok(Entity::Field(self.resolve_field(token, context)?))
                } else {
                    Ok(Entity::Method(self.resolve_method(token, context)?))
                }
            }
            TableId::Param => Ok(Entity::Parameter(self.parameter_definition(rid)?)),
            TableId::Property => Ok(Entity::Property(self.property_definition(rid)?)),
            TableId::Event => Ok(Entity::Event(self.event_definition(rid)?)),
            TableId::GenericParam => Ok(Entity::GenericParameter(self.generic_parameter(rid)?)),
            TableId::ModuleRef => match self.tables().moduleref.get(rid) {
                Some(row) => Ok(Entity::ModuleRef(self.heaps().get_name(row.name)?)),
                None => Err(malformed_error!("ModuleRef {} does not exist", rid)),
            },
            TableId::AssemblyRef => match self.tables().assemblyref.get(rid) {
                Some(row) => Ok(Entity::AssemblyRef(AssemblyIdentity::from_assembly_ref(
                    row,
                    self.heaps(),
                )?)),
                None => Err(malformed_error!("AssemblyRef {} does not exist", rid)),
            },
            _ => Err(malformed_error!("Token {} does not name an entity", token)),
        }
    }

    /// The `#US` literal of a `0x70` token.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for other tokens or offsets outside the heap.
    pub fn resolve_string(&self, token: Token) -> Result<Arc<str>> {
        self.ensure_live()?;
        if !token.is_user_string() {
            return Err(malformed_error!("Token {} is not a user string", token));
        }
        self.heaps().resolve_user_string(token)
    }

    /// Resolves a `TypeDef`, `TypeRef` or `TypeSpec` token.
    ///
    /// # Errors
    /// Returns [`Error::TypeLoad`] for references that do not resolve (unless missing-member
    /// tolerance is on), [`Error::FileNotFound`] for unlocatable assemblies or modules, and a
    /// format error for other tokens.
    pub fn resolve_type(&self, token: Token, context: &dyn GenericContext) -> Result<TypeRc> {
        self.ensure_live()?;
        match token.table_id() {
            Some(TableId::TypeDef) => self.type_def_rc(token.row()),
            Some(TableId::TypeRef) => self.resolve_type_ref(token.row(), 0),
            Some(TableId::TypeSpec) => self.resolve_type_spec(token.row(), context),
            _ => Err(malformed_error!("Token {} is not a type", token)),
        }
    }

    /// Resolves a `MethodDef`, `MemberRef` or `MethodSpec` token.
    ///
    /// # Errors
    /// Returns [`Error::MissingMethod`] for references that match no method (unless
    /// missing-member tolerance is on), the errors of resolving the owner type, and a format
    /// error for other tokens.
    pub fn resolve_method(&self, token: Token, context: &dyn GenericContext) -> Result<Method> {
        self.ensure_live()?;
        match token.table_id() {
            Some(TableId::MethodDef) => Ok(Method::Definition(
                self.method_definition(token.row())?,
            )),
            Some(TableId::MemberRef) => self.resolve_member_ref_method(token.row(), context),
            Some(TableId::MethodSpec) => self.resolve_method_spec(token.row(), context),
            _ => Err(malformed_error!("Token {} is not a method", token)),
        }
    }

    /// Resolves a `Field` or `MemberRef` token.
    ///
    /// # Errors
    /// Returns [`Error::MissingField`] for references that match no field (unless
    /// missing-member tolerance is on), the errors of resolving the owner type, and a format
    /// error for other tokens.
    pub fn resolve_field(&self, token: Token, context: &dyn GenericContext) -> Result<Field> {
        self.ensure_live()?;
        match token.table_id() {
            Some(TableId::Field) => Ok(Field::Definition(self.field_definition(token.row())?)),
            Some(TableId::MemberRef) => self.resolve_member_ref_field(token.row(), context),
            _ => Err(malformed_error!("Token {} is not a field", token)),
        }
    }

    /// Turns a signature type into a resolved type. `!n` and `!!n` are taken from `context`.
    ///
    /// `pinned` is dropped; custom modifiers are not part of [`Type`].
    ///
    /// # Errors
    /// Propagates resolution failures of the referenced tokens and of `context`.
    pub fn type_from_signature(
        &self,
        signature: &TypeSignature,
        context: &dyn GenericContext,
    ) -> Result<TypeRc> {
        let primitive = |kind| -> Result<TypeRc> { Ok(Type::primitive(kind)) };
        match signature {
            TypeSignature::Void => primitive(PrimitiveKind::Void),
            TypeSignature::Boolean => primitive(PrimitiveKind::Boolean),
            TypeSignature::Char => primitive(PrimitiveKind::Char),
            TypeSignature::I1 => primitive(PrimitiveKind::I1),
            TypeSignature::U1 => primitive(PrimitiveKind::U1),
            TypeSignature::I2 => primitive(PrimitiveKind::I2),
            TypeSignature::U2 => primitive(PrimitiveKind::U2),
            TypeSignature::I4 => primitive(PrimitiveKind::I4),
            TypeSignature::U4 => primitive(PrimitiveKind::U4),
            TypeSignature::I8 => primitive(PrimitiveKind::I8),
            TypeSignature::U8 => primitive(PrimitiveKind::U8),
            TypeSignature::R4 => primitive(PrimitiveKind::R4),
            TypeSignature::R8 => primitive(PrimitiveKind::R8),
            TypeSignature::I => primitive(PrimitiveKind::I),
            TypeSignature::U => primitive(PrimitiveKind::U),
            TypeSignature::String => primitive(PrimitiveKind::String),
            TypeSignature::Object => primitive(PrimitiveKind::Object),
            TypeSignature::TypedByRef => primitive(PrimitiveKind::TypedReference),
            TypeSignature::Ptr(inner) => Ok(Arc::new(Type::Pointer(
                self.type_from_signature(inner, context)?,
            ))),
            TypeSignature::ByRef(inner) => Ok(Arc::new(Type::ByRef(
                self.type_from_signature(inner, context)?,
            ))),
            TypeSignature::SzArray(inner) => Ok(Arc::new(Type::SzArray(
                self.type_from_signature(inner, context)?,
            ))),
            TypeSignature::Array(array) => Ok(Arc::new(Type::Array(ArrayType {
                element: self.type_from_signature(&array.base, context)?,
                rank: array.rank,
                sizes: array.sizes.clone(),
                lower_bounds: array.lower_bounds.clone(),
            }))),
            TypeSignature::ValueType(token) | TypeSignature::Class(token) => {
                self.resolve_type(*token, context)
            }
            TypeSignature::GenericParamType(position) => context.generic_type_argument(*position),
            TypeSignature::GenericParamMethod(position) => {
                context.generic_method_argument(*position)
            }
            TypeSignature::GenericInst(definition, args) => {
                let definition = self.type_from_signature(definition, context)?;
                let args = args
                    .iter()
                    .map(|arg| self.type_from_signature(arg, context))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Arc::new(Type::GenericInstance(GenericInstance {
                    definition,
                    args,
                })))
            }
            TypeSignature::FnPtr(method) => Ok(Arc::new(Type::FunctionPointer(Box::new(
                self.method_sig_from(method, context)?,
            )))),
            TypeSignature::Pinned(inner) => self.type_from_signature(inner, context),
        }
    }

    /// A parameter or return type; by-ref parameters become [`Type::ByRef`].
    ///
    /// # Errors
    /// See [`ModuleImage::type_from_signature`].
    pub fn parameter_type(
        &self,
        parameter: &SignatureParameter,
        context: &dyn GenericContext,
    ) -> Result<TypeRc> {
        let base = self.type_from_signature(&parameter.base, context)?;
        if parameter.by_ref {
            Ok(Arc::new(Type::ByRef(base)))
        } else {
            Ok(base)
        }
    }

    /// Resolves every type of a method signature.
    ///
    /// # Errors
    /// See [`ModuleImage::type_from_signature`].
    pub fn method_sig_from(
        &self,
        signature: &SignatureMethod,
        context: &dyn GenericContext,
    ) -> Result<MethodSig> {
        let types = |params: &[SignatureParameter]| {
            params
                .iter()
                .map(|param| self.parameter_type(param, context))
                .collect::<Result<Vec<_>>>()
        };

        Ok(MethodSig {
            has_this: signature.has_this,
            explicit_this: signature.explicit_this,
            calling_convention: signature.calling_convention,
            generic_param_count: signature.generic_param_count,
            return_type: self.parameter_type(&signature.return_type, context)?,
            params: types(&signature.params)?,
            varargs: types(&signature.varargs)?,
        })
    }

    fn resolve_type_ref(&self, rid: u32, depth: usize) -> Result<TypeRc> {
        if depth > MAX_TYPE_REF_DEPTH {
            return Err(malformed_error!(
                "TypeRef {} is nested deeper than {} levels",
                rid,
                MAX_TYPE_REF_DEPTH
            ));
        }

        self.cache()
            .type_refs
            .get_or_try_init(rid, || self.load_type_ref(rid, depth))
    }

    fn load_type_ref(&self, rid: u32, depth: usize) -> Result<TypeRc> {
        let Some(row) = self.tables().typeref.get(rid) else {
            return Err(malformed_error!("TypeRef {} does not exist", rid));
        };
        let namespace = self.heaps().get_name(row.type_namespace)?;
        let name = self.heaps().get_name(row.type_name)?;
        let scope = row.resolution_scope;

        if scope.is_null() {
            let exported = self.tables().exportedtype.iter().find(|exported| {
                self.heaps().get_name(exported.type_namespace).ok().as_ref() == Some(&namespace)
                    && self.heaps().get_name(exported.type_name).ok().as_ref() == Some(&name)
            });
            return match exported {
                Some(exported) => self.resolve_exported_type(exported.rid, 0),
                None => self.missing_type(&namespace, &name, self.name()),
            };
        }

        let (found, scope_name) = match scope.tag {
            TableId::Module => (self.find_type(&namespace, &name)?, self.name().to_string()),
            TableId::ModuleRef => {
                let target = self.module_ref_target(scope.row)?;
                (
                    target.find_type(&namespace, &name)?,
                    target.name().to_string(),
                )
            }
            TableId::AssemblyRef => match self.assembly_ref_target(scope.row)? {
                (Some(assembly), identity) => (
                    assembly.find_type(&namespace, &name)?,
                    identity.display_name(),
                ),
                (None, identity) => (None, identity.display_name()),
            },
            TableId::TypeRef => {
                let outer = self.resolve_type_ref(scope.row, depth + 1)?;
                let nested = match outer.definition() {
                    Some(definition) => definition.find_nested_type(&name)?,
                    None => None,
                };
                (nested, outer.full_name())
            }
            _ => {
                return Err(malformed_error!(
                    "TypeRef {} has a resolution scope in table {:?}",
                    rid,
                    scope.tag
                ))
            }
        };

        match found {
            Some(ty) => Ok(ty),
            None => self.missing_type(&namespace, &name, &scope_name),
        }
    }

    /// Placeholder under missing-member tolerance, [`Error::TypeLoad`] otherwise.
    fn missing_type(&self, namespace: &str, name: &str, scope: &str) -> Result<TypeRc> {
        let type_name = qualified(namespace, name);
        if !self.options().missing_member_tolerance {
            return Err(Error::TypeLoad {
                type_name,
                scope: scope.to_string(),
            });
        }

        tracing::warn!(
            type_name = type_name.as_str(),
            scope,
            "type not found, substituting a placeholder"
        );
        Ok(Arc::new(Type::Missing(Arc::new(MissingType {
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope: scope.to_string(),
        }))))
    }

    fn module_ref_target(&self, rid: u32) -> Result<Arc<ModuleImage>> {
        let Some(row) = self.tables().moduleref.get(rid) else {
            return Err(malformed_error!("ModuleRef {} does not exist", rid));
        };
        let name = self.heaps().get_name(row.name)?;
        if name.eq_ignore_ascii_case(self.name()) {
            return self.arc();
        }

        match self.assembly() {
            Some(assembly) => assembly.module_by_name(&name),
            None => Err(Error::FileNotFound(name.to_string())),
        }
    }

    /// The assembly an `AssemblyRef` row names, `None` if it cannot be located under
    /// missing-member tolerance.
    fn assembly_ref_target(
        &self,
        rid: u32,
    ) -> Result<(Option<Arc<AssemblyImage>>, AssemblyIdentity)> {
        let Some(row) = self.tables().assemblyref.get(rid) else {
            return Err(malformed_error!("AssemblyRef {} does not exist", rid));
        };
        let identity = AssemblyIdentity::from_assembly_ref(row, self.heaps())?;

        let requesting = self.assembly();
        if let Some(own) = &requesting {
            if own.identity().satisfies(&identity) {
                return Ok((Some(own.clone()), identity));
            }
        }

        let target = self.universe()?.load(
            &identity.display_name(),
            requesting.as_deref(),
            !self.options().missing_member_tolerance,
        )?;
        Ok((target, identity))
    }

    /// Follows an `ExportedType` row to the type it stands for.
    ///
    /// Nested exports chain through their enclosing export. A cycle within the table is
    /// malformed; forwarding across assemblies is bounded by `max_forwarding_depth`.
    pub(crate) fn resolve_exported_type(&self, rid: u32, depth: usize) -> Result<TypeRc> {
        let limit = self.options().max_forwarding_depth;
        if depth > limit {
            return Err(Error::RecursionLimit(limit));
        }
        if let Some(ty) = self.cache().forwarded.get(&rid) {
            return Ok(ty);
        }

        let mut names = Vec::new();
        let mut visited = HashSet::new();
        let mut current = rid;
        let implementation: CodedIndex = loop {
            if !visited.insert(current) {
                return Err(malformed_error!(
                    "ExportedType {} is part of a forwarding cycle",
                    rid
                ));
            }
            let Some(row) = self.tables().exportedtype.get(current) else {
                return Err(malformed_error!("ExportedType {} does not exist", current));
            };
            names.push((
                self.heaps().get_name(row.type_namespace)?,
                self.heaps().get_name(row.type_name)?,
            ));
            match row.implementation.tag {
                TableId::ExportedType => current = row.implementation.row,
                _ => break row.implementation,
            }
        };

        let Some((namespace, name)) = names.pop() else {
            return Err(malformed_error!("ExportedType {} has no name", rid));
        };

        let (outer, scope) = match implementation.tag {
            TableId::AssemblyRef => match self.assembly_ref_target(implementation.row)? {
                (Some(assembly), identity) => (
                    assembly.find_type_at_depth(&namespace, &name, depth + 1)?,
                    identity.display_name(),
                ),
                (None, identity) => (None, identity.display_name()),
            },
            TableId::File => {
                let Some(file) = self.tables().file.get(implementation.row) else {
                    return Err(malformed_error!(
                        "ExportedType {} names File {} which does not exist",
                        rid,
                        implementation.row
                    ));
                };
                let file_name = self.heaps().get_name(file.name)?;
                let module = match self.assembly() {
                    Some(assembly) => assembly.module_by_name(&file_name)?,
                    None => return Err(Error::FileNotFound(file_name.to_string())),
                };
                (
                    module.find_type_at_depth(&namespace, &name, depth + 1)?,
                    file_name.to_string(),
                )
            }
            _ => {
                return Err(malformed_error!(
                    "ExportedType {} has an implementation in table {:?}",
                    rid,
                    implementation.tag
                ))
            }
        };

        let Some(mut ty) = outer else {
            return self.missing_type(&namespace, &name, &scope);
        };
        for (_, nested) in names.iter().rev() {
            let found = match ty.definition() {
                Some(definition) => definition.find_nested_type(nested)?,
                None => None,
            };
            ty = match found {
                Some(found) => found,
                None => return self.missing_type("", nested, &ty.full_name()),
            };
        }

        tracing::debug!(
            module = self.name(),
            exported = rid,
            resolved = %ty,
            "resolved forwarded type"
        );
        self.cache().forwarded.get_or_try_init(rid, || Ok(ty))
    }

    fn resolve_type_spec(&self, rid: u32, context: &dyn GenericContext) -> Result<TypeRc> {
        cached_with_context(&self.cache().type_specs, rid, context, |context| {
            let Some(row) = self.tables().typespec.get(rid) else {
                return Err(malformed_error!("TypeSpec {} does not exist", rid));
            };
            let signature = SignatureParser::from_parser(self.heaps().get_blob(row.signature)?)
                .parse_type_spec_signature()?;
            self.type_from_signature(&signature, context)
        })
    }

    fn member_ref_row(&self, rid: u32) -> Result<&MemberRefRaw> {
        self.tables()
            .memberref
            .get(rid)
            .ok_or_else(|| malformed_error!("MemberRef {} does not exist", rid))
    }

    pub(crate) fn member_ref_is_field(&self, rid: u32) -> Result<bool> {
        let row = self.member_ref_row(rid)?;
        Ok(is_field_signature(
            &self.heaps().get_blob_copy(row.signature)?,
        ))
    }

    fn member_ref_parent(
        &self,
        row: &MemberRefRaw,
        context: &dyn GenericContext,
    ) -> Result<MemberParent> {
        match row.class.tag {
            TableId::MethodDef => Ok(MemberParent::Method(Method::Definition(
                self.method_definition(row.class.row)?,
            ))),
            TableId::ModuleRef => match self.module_ref_target(row.class.row)?.module_type()? {
                Some(global) => Ok(MemberParent::Type(global)),
                None => Err(malformed_error!(
                    "ModuleRef {} names a module without types",
                    row.class.row
                )),
            },
            TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec => {
                Ok(MemberParent::Type(self.resolve_type(row.class.token, context)?))
            }
            _ => Err(malformed_error!(
                "MemberRef {} has a parent in table {:?}",
                row.rid,
                row.class.tag
            )),
        }
    }

    /// The context a member reference signature is read in: `!n` are the owner's arguments
    /// (or its own parameters for a plain definition) and `!!n` are unbound positions.
    fn owner_context(&self, owner: &TypeRc, method_params: u32) -> Result<GenericArguments> {
        let type_args = match owner.as_ref() {
            Type::GenericInstance(instance) => instance.args.clone(),
            Type::Definition(definition) => definition.generic_parameters()?,
            _ => Vec::new(),
        };

        Ok(GenericArguments::new(
            type_args,
            self.unbound_method_args(method_params)?,
        ))
    }

    /// The context a member reference signature is matched in: `!n` are the generic parameters
    /// of the owner's definition, so `!0` and the type argument it is bound to stay distinct.
    fn definition_match_context(
        &self,
        owner: &TypeRc,
        method_params: u32,
    ) -> Result<GenericArguments> {
        let type_args = match owner.definition() {
            Some(definition) => definition.generic_parameters()?,
            None => Vec::new(),
        };

        Ok(GenericArguments::new(
            type_args,
            self.unbound_method_args(method_params)?,
        ))
    }

    fn unbound_method_args(&self, count: u32) -> Result<Vec<TypeRc>> {
        let universe = self.universe()?;
        Ok((0..count)
            .map(|position| universe.unbound_method_parameter(position))
            .collect())
    }

    fn resolve_member_ref_method(&self, rid: u32, context: &dyn GenericContext) -> Result<Method> {
        cached_with_context(&self.cache().member_ref_methods, rid, context, |context| {
            if self.member_ref_is_field(rid)? {
                return Err(malformed_error!("MemberRef {} names a field", rid));
            }

            let row = self.member_ref_row(rid)?;
            let name = self.heaps().get_name(row.name)?;
            let raw = SignatureParser::from_parser(self.heaps().get_blob(row.signature)?)
                .parse_method_signature()?;

            match self.member_ref_parent(row, context)? {
                MemberParent::Method(method) => Ok(method),
                MemberParent::Type(owner) => self.find_method(&owner, &name, &raw),
            }
        })
    }

    fn find_method(&self, owner: &TypeRc, name: &str, raw: &SignatureMethod) -> Result<Method> {
        let owner_context = self.owner_context(owner, raw.generic_param_count)?;
        let signature = self.method_sig_from(raw, &owner_context)?;

        if let Type::Array(_) = owner.as_ref() {
            if let Some(kind) = ArrayMethodKind::from_name(name) {
                return Ok(Method::Array(Arc::new(ArrayMethod {
                    declaring_type: owner.clone(),
                    kind,
                    name: name.into(),
                    signature: Arc::new(signature),
                })));
            }
        }

        let match_context = self.definition_match_context(owner, raw.generic_param_count)?;
        let wanted = self.method_sig_from(raw, &match_context)?;
        let unbound = GenericArguments::new(Vec::new(), match_context.method_args.clone());
        for ty in owner.hierarchy()? {
            for method in ty.declared_methods()? {
                if method.name() != name {
                    continue;
                }
                let candidate = match method.definition() {
                    Some(definition) => definition.signature()?,
                    None => method.signature()?,
                };
                if wanted.matches(&candidate.bind(&unbound)) {
                    return Ok(method);
                }
            }
        }

        // Inherited members of a generic base see the owner's arguments, not its parameters.
        for ty in owner.hierarchy()?.iter().skip(1) {
            for method in ty.declared_methods()? {
                if method.name() == name
                    && signature.matches(&method.signature()?.bind(&unbound))
                {
                    return Ok(method);
                }
            }
        }

        if !self.options().missing_member_tolerance {
            return Err(Error::MissingMethod {
                owner: owner.full_name(),
                name: name.to_string(),
            });
        }

        tracing::warn!(owner = %owner, name, "method not found, substituting a placeholder");
        Ok(Method::Missing(Arc::new(MissingMethod {
            owner: owner.clone(),
            name: name.to_string(),
            signature: Arc::new(signature),
        })))
    }

    fn resolve_member_ref_field(&self, rid: u32, context: &dyn GenericContext) -> Result<Field> {
        cached_with_context(&self.cache().member_ref_fields, rid, context, |context| {
            if !self.member_ref_is_field(rid)? {
                return Err(malformed_error!("MemberRef {} names a method", rid));
            }

            let row = self.member_ref_row(rid)?;
            let name = self.heaps().get_name(row.name)?;
            let raw = SignatureParser::from_parser(self.heaps().get_blob(row.signature)?)
                .parse_field_signature()?;

            let MemberParent::Type(owner) = self.member_ref_parent(row, context)? else {
                return Err(malformed_error!("MemberRef {} is a field of a method", rid));
            };
            let match_context = self.definition_match_context(&owner, 0)?;
            let wanted = self.type_from_signature(&raw.base, &match_context)?;

            for ty in owner.hierarchy()? {
                for field in ty.declared_fields()? {
                    if field.name() != &*name {
                        continue;
                    }
                    let candidate = match field.definition() {
                        Some(definition) => definition.field_type()?,
                        None => field.field_type()?,
                    };
                    if candidate == wanted {
                        return Ok(field);
                    }
                }
            }

            let owner_context = self.owner_context(&owner, 0)?;
            let field_type = self.type_from_signature(&raw.base, &owner_context)?;
            for ty in owner.hierarchy()?.iter().skip(1) {
                for field in ty.declared_fields()? {
                    if field.name() == &*name && field.field_type()? == field_type {
                        return Ok(field);
                    }
                }
            }

            if !self.options().missing_member_tolerance {
                return Err(Error::MissingField {
                    owner: owner.full_name(),
                    name: name.to_string(),
                });
            }

            tracing::warn!(owner = %owner, name = &*name, "field not found, substituting a placeholder");
            Ok(Field::Missing(Arc::new(MissingField {
                owner,
                name: name.to_string(),
                field_type,
            })))
        })
    }

    fn resolve_method_spec(&self, rid: u32, context: &dyn GenericContext) -> Result<Method> {
        cached_with_context(&self.cache().method_specs, rid, context, |context| {
            let Some(row) = self.tables().methodspec.get(rid) else {
                return Err(malformed_error!("MethodSpec {} does not exist", rid));
            };

            let method = self.resolve_method(row.method.token, context)?;
            let instantiation =
                SignatureParser::from_parser(self.heaps().get_blob(row.instantiation)?)
                    .parse_method_spec_signature()?;
            let args = instantiation
                .generic_args
                .iter()
                .map(|arg| self.type_from_signature(arg, context))
                .collect::<Result<Vec<_>>>()?;

            let binder = GenericArguments::new(Vec::new(), args.clone());
            let signature = Arc::new(method.signature()?.bind(&binder));

            match method {
                Method::Definition(definition) => {
                    let Some(declaring_type) = definition.declaring_type()? else {
                        return Err(malformed_error!(
                            "MethodDef {} has no declaring type",
                            definition.token.row()
                        ));
                    };
                    Ok(Method::Bound(Arc::new(BoundMethod {
                        definition,
                        declaring_type,
                        method_args: args,
                        signature,
                    })))
                }
                Method::Bound(bound) => Ok(Method::Bound(Arc::new(BoundMethod {
                    definition: bound.definition.clone(),
                    declaring_type: bound.declaring_type.clone(),
                    method_args: args,
                    signature,
                }))),
                Method::Missing(missing) => Ok(Method::Missing(Arc::new(MissingMethod {
                    owner: missing.owner.clone(),
                    name: missing.name.clone(),
                    signature,
                }))),
                Method::Array(_) => Err(malformed_error!(
                    "MethodSpec {} instantiates an array method",
                    rid
                )),
            }
        })
    }
}
