//! Generic contexts, binders and generic parameters.
//!
//! Signatures refer to generic parameters by position only (`!0` for the first type parameter
//! of the enclosing type, `!!0` for the first method parameter). A [`GenericContext`] supplies
//! the types those positions stand for while a signature is resolved, and a [`TypeBinder`]
//! substitutes them afterwards when a member of a generic definition is projected onto an
//! instantiation.

use std::{
    cell::Cell,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    metadata::{
        members::HasCustomAttributes,
        module::ModuleImage,
        tables::{GenericParamAttributes, TableId},
        token::Token,
        typesystem::TypeRc,
    },
    Error, Result,
};

/// Supplies the types that `VAR` and `MVAR` positions stand for during signature resolution.
pub trait GenericContext {
    /// The type argument at `position` of the enclosing generic type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the context has no argument at `position`.
    fn generic_type_argument(&self, position: u32) -> Result<TypeRc>;

    /// The type argument at `position` of the enclosing generic method.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the context has no argument at `position`.
    fn generic_method_argument(&self, position: u32) -> Result<TypeRc>;
}

/// Substitutes generic parameters when projecting a definition onto an instantiation.
///
/// Returning `None` leaves the parameter in place.
pub trait TypeBinder {
    /// The replacement for type parameter `position`.
    fn bind_type_parameter(&self, position: u32) -> Option<TypeRc>;

    /// The replacement for method parameter `position`.
    fn bind_method_parameter(&self, position: u32) -> Option<TypeRc>;
}

/// Explicit type and method arguments.
///
/// Used both as the caller-supplied context of a resolution and as the definition context of a
/// member, where the arguments are the member's own generic parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GenericArguments {
    /// Arguments for `!n`
    pub type_args: Vec<TypeRc>,
    /// Arguments for `!!n`
    pub method_args: Vec<TypeRc>,
}

impl GenericArguments {
    /// A context without any arguments.
    #[must_use]
    pub fn none() -> Self {
        GenericArguments::default()
    }

    /// A context with the given arguments.
    #[must_use]
    pub fn new(type_args: Vec<TypeRc>, method_args: Vec<TypeRc>) -> Self {
        GenericArguments {
            type_args,
            method_args,
        }
    }

    /// `true` if neither list has arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_args.is_empty() && self.method_args.is_empty()
    }
}

impl GenericContext for GenericArguments {
    fn generic_type_argument(&self, position: u32) -> Result<TypeRc> {
        self.type_args.get(position as usize).cloned().ok_or_else(|| {
            malformed_error!(
                "Generic type argument !{} is outside of the context ({} arguments)",
                position,
                self.type_args.len()
            )
        })
    }

    fn generic_method_argument(&self, position: u32) -> Result<TypeRc> {
        self.method_args.get(position as usize).cloned().ok_or_else(|| {
            malformed_error!(
                "Generic method argument !!{} is outside of the context ({} arguments)",
                position,
                self.method_args.len()
            )
        })
    }
}

impl TypeBinder for GenericArguments {
    fn bind_type_parameter(&self, position: u32) -> Option<TypeRc> {
        self.type_args.get(position as usize).cloned()
    }

    fn bind_method_parameter(&self, position: u32) -> Option<TypeRc> {
        self.method_args.get(position as usize).cloned()
    }
}

/// Wraps a context and records whether it was consulted.
///
/// A resolution that consulted its context produced a result specific to the caller's
/// arguments, which must not be cached at module level.
pub struct TrackingGenericContext<'a> {
    inner: &'a dyn GenericContext,
    used: Cell<bool>,
}

impl<'a> TrackingGenericContext<'a> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: &'a dyn GenericContext) -> Self {
        TrackingGenericContext {
            inner,
            used: Cell::new(false),
        }
    }

    /// `true` once any argument has been requested.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used.get()
    }
}

impl GenericContext for TrackingGenericContext<'_> {
    fn generic_type_argument(&self, position: u32) -> Result<TypeRc> {
        self.used.set(true);
        self.inner.generic_type_argument(position)
    }

    fn generic_method_argument(&self, position: u32) -> Result<TypeRc> {
        self.used.set(true);
        self.inner.generic_method_argument(position)
    }
}

/// A `GenericParam` row: a formal type parameter of a type or method definition.
pub struct GenericTypeParameter {
    module: Weak<ModuleImage>,
    /// `GenericParam` token
    pub token: Token,
    /// Zero-based position in the owner's parameter list
    pub number: u32,
    /// `GenericParamAttributes` bitmask
    pub flags: u32,
    /// Parameter name, e.g. `T`
    pub name: Arc<str>,
    /// The owning `TypeDef` or `MethodDef`
    pub owner: Token,
    constraints: OnceLock<Vec<TypeRc>>,
}

impl GenericTypeParameter {
    pub(crate) fn new(
        module: Weak<ModuleImage>,
        token: Token,
        number: u32,
        flags: u32,
        name: Arc<str>,
        owner: Token,
    ) -> Self {
        GenericTypeParameter {
            module,
            token,
            number,
            flags,
            name,
            owner,
            constraints: OnceLock::new(),
        }
    }

    /// `true` if the owner is a method.
    #[must_use]
    pub fn is_method_parameter(&self) -> bool {
        self.owner.table_id() == Some(TableId::MethodDef)
    }

    /// `GenericParamAttributes::VARIANCE_MASK` bits.
    #[must_use]
    pub fn variance(&self) -> u32 {
        self.flags & GenericParamAttributes::VARIANCE_MASK
    }

    /// `GenericParamAttributes::SPECIAL_CONSTRAINT_MASK` bits.
    #[must_use]
    pub fn special_constraints(&self) -> u32 {
        self.flags & GenericParamAttributes::SPECIAL_CONSTRAINT_MASK
    }

    /// The module that defines this parameter.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    pub fn module(&self) -> Result<Arc<ModuleImage>> {
        self.module.upgrade().ok_or(Error::Disposed)
    }

    /// The types named by `GenericParamConstraint` rows for this parameter.
    ///
    /// Each constraint is resolved in the context of the owner, so `T : IComparable<T>` refers
    /// back to this parameter.
    ///
    /// # Errors
    /// Propagates resolution failures of the constraint types.
    pub fn constraints(&self) -> Result<Vec<TypeRc>> {
        if let Some(constraints) = self.constraints.get() {
            return Ok(constraints.clone());
        }

        let module = self.module()?;
        let context = match self.owner.table_id() {
            Some(TableId::MethodDef) => module
                .method_definition(self.owner.row())?
                .definition_context()?,
            _ => module.type_definition(self.owner.row())?.definition_context()?,
        };

        let tables = module.tables();
        let mut constraints = Vec::new();
        for rid in tables.genericparamconstraint.find_all(self.token) {
            let Some(row) = tables.genericparamconstraint.get(rid) else {
                continue;
            };
            constraints.push(module.resolve_type(row.constraint.token, &context)?);
        }

        Ok(self.constraints.get_or_init(|| constraints).clone())
    }
}

impl HasCustomAttributes for GenericTypeParameter {
    fn metadata_token(&self) -> Token {
        self.token
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        self.module()
    }
}

impl PartialEq for GenericTypeParameter {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token && Weak::ptr_eq(&self.module, &other.module)
    }
}

impl Eq for GenericTypeParameter {}

impl Hash for GenericTypeParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
        self.module.as_ptr().hash(state);
    }
}

impl fmt::Debug for GenericTypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericTypeParameter")
            .field("token", &self.token)
            .field("number", &self.number)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{PrimitiveKind, Type};

    fn int32() -> TypeRc {
        Arc::new(Type::Primitive(PrimitiveKind::I4))
    }

    #[test]
    fn arguments_in_range() {
        let context = GenericArguments::new(vec![int32()], vec![]);
        assert_eq!(
            *context.generic_type_argument(0).unwrap(),
            Type::Primitive(PrimitiveKind::I4)
        );
        assert!(matches!(
            context.generic_type_argument(1),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            context.generic_method_argument(0),
            Err(Error::Malformed { .. })
        ));
        assert!(GenericArguments::none().is_empty());
    }

    #[test]
    fn tracking_records_use() {
        let context = GenericArguments::new(vec![int32()], vec![int32()]);
        let tracking = TrackingGenericContext::new(&context);
        assert!(!tracking.is_used());

        tracking.generic_method_argument(0).unwrap();
        assert!(tracking.is_used());

        let failing = TrackingGenericContext::new(&context);
        assert!(failing.generic_type_argument(5).is_err());
        assert!(failing.is_used());
    }

    #[test]
    fn binder_leaves_unknown_positions() {
        let arguments = GenericArguments::new(vec![int32()], vec![]);
        assert!(arguments.bind_type_parameter(0).is_some());
        assert!(arguments.bind_type_parameter(1).is_none());
        assert!(arguments.bind_method_parameter(0).is_none());
    }
}
