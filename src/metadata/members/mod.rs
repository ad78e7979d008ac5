//! Lazily constructed entities: types, methods, fields, properties, events and parameters.
//!
//! Every definition wraps `(module, row)` and computes the rest of its state on first access.
//! The owning [`ModuleImage`] caches one instance per row, so equality of definitions is
//! identity: the same module and the same token.
//!
//! Members reached through a generic instance (`List<int>.Add`) are *bound*: they pair the
//! definition with the instantiated declaring type and a signature in which the type
//! parameters have been substituted.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilreader::{metadata::members::BindingFlags, Universe, UniverseOptions};
//!
//! let universe = Universe::new(UniverseOptions::default());
//! let assembly = universe.load_file("tests/samples/library.dll".as_ref())?;
//! if let Some(ty) = assembly.find_type("N", "C")? {
//!     for field in ty.get_fields(BindingFlags::PUBLIC | BindingFlags::INSTANCE)? {
//!         println!("{}: {}", field.name(), field.field_type()?);
//!     }
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

mod field;
mod method;
mod property;
mod typedef;

pub use field::{BoundField, FieldDefinition, MissingField};
pub use method::{
    ArrayMethod, ArrayMethodKind, BoundMethod, MethodDefinition, MissingMethod,
    ParameterDefinition, PInvokeInfo,
};
pub use property::{EventDefinition, PropertyDefinition};
pub use typedef::{ClassLayout, TypeDefinition};

use std::sync::Arc;

use bitflags::bitflags;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        module::ModuleImage,
        token::Token,
        typesystem::{GenericArguments, MethodSig, Type, TypeRc},
    },
    Result,
};

/// Upper bound on base type chains walked during member lookup.
pub(crate) const MAX_INHERITANCE_DEPTH: usize = 256;

bitflags! {
    /// Selects members during enumeration.
    ///
    /// A member is returned when its visibility (`PUBLIC`/`NON_PUBLIC`) and its binding
    /// (`INSTANCE`/`STATIC`) are both selected. Inherited members are included unless
    /// `DECLARED_ONLY` is set; private members of base types never are, static ones only with
    /// `FLATTEN_HIERARCHY`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BindingFlags: u32 {
        /// Only members declared by the type itself
        const DECLARED_ONLY = 0x02;
        /// Instance members
        const INSTANCE = 0x04;
        /// Static members
        const STATIC = 0x08;
        /// Public members
        const PUBLIC = 0x10;
        /// Non-public members
        const NON_PUBLIC = 0x20;
        /// Static members of base types
        const FLATTEN_HIERARCHY = 0x40;
        /// Everything declared or inherited
        const ALL = Self::INSTANCE.bits() | Self::STATIC.bits() | Self::PUBLIC.bits()
            | Self::NON_PUBLIC.bits();
    }
}

/// Visibility and binding of a member, computed together on first access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemberFlags {
    /// Visible everywhere
    pub is_public: bool,
    /// No `this`
    pub is_static: bool,
    /// Visible to derived types
    pub is_non_private: bool,
}

impl MemberFlags {
    /// Flags of a field or method from its access mask and static bit.
    #[must_use]
    pub fn from_access(access: u32, public: u32, private: u32, is_static: bool) -> Self {
        MemberFlags {
            is_public: access == public,
            is_static,
            is_non_private: access > private,
        }
    }

    /// Combines the flags of accessor methods: a property is as visible as its most visible
    /// accessor.
    #[must_use]
    pub fn union(self, other: MemberFlags) -> Self {
        MemberFlags {
            is_public: self.is_public || other.is_public,
            is_static: self.is_static || other.is_static,
            is_non_private: self.is_non_private || other.is_non_private,
        }
    }

    /// `true` if a member with these flags is selected by `flags`.
    #[must_use]
    pub fn matches(&self, flags: BindingFlags, inherited: bool) -> bool {
        let visibility = if self.is_public {
            BindingFlags::PUBLIC
        } else {
            BindingFlags::NON_PUBLIC
        };
        let binding = if self.is_static {
            BindingFlags::STATIC
        } else {
            BindingFlags::INSTANCE
        };

        if !flags.contains(visibility) || !flags.contains(binding) {
            return false;
        }

        if inherited {
            if !self.is_non_private {
                return false;
            }
            if self.is_static && !flags.contains(BindingFlags::FLATTEN_HIERARCHY) {
                return false;
            }
        }

        true
    }
}

/// Entities that can carry `CustomAttribute` rows.
pub trait HasCustomAttributes {
    /// Token the attributes are keyed by.
    fn metadata_token(&self) -> Token;

    /// Module whose `CustomAttribute` table holds the attributes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Disposed`] if the module has been dropped.
    fn owning_module(&self) -> Result<Arc<ModuleImage>>;

    /// The attributes applied to this entity, in table order.
    ///
    /// # Errors
    /// Propagates resolution failures of the attribute constructors.
    fn custom_attributes(&self) -> Result<Vec<CustomAttribute>> {
        self.owning_module()?
            .custom_attributes_of(self.metadata_token())
    }
}

/// Entities declared inside a type.
pub trait HasDeclaringType {
    /// The declaring type, `None` for top-level types.
    ///
    /// # Errors
    /// Propagates resolution failures.
    fn declaring_type(&self) -> Result<Option<TypeRc>>;
}

/// Entities that may declare generic parameters.
pub trait HasGenericParameters {
    /// The formal parameters in position order, each a [`Type::GenericParameter`].
    ///
    /// # Errors
    /// Propagates failures reading the `GenericParam` rows.
    fn generic_parameters(&self) -> Result<Vec<TypeRc>>;

    /// `true` if at least one parameter is declared.
    ///
    /// # Errors
    /// See [`HasGenericParameters::generic_parameters`].
    fn is_generic_definition(&self) -> Result<bool> {
        Ok(!self.generic_parameters()?.is_empty())
    }
}

/// A `CustomAttribute` row with its constructor resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomAttribute {
    /// Token of the entity the attribute is applied to
    pub owner: Token,
    /// The attribute constructor
    pub constructor: Method,
    /// The undecoded `CustomAttrib` value blob
    pub value: Vec<u8>,
}

impl CustomAttribute {
    /// The attribute type, i.e. the constructor's declaring type.
    ///
    /// # Errors
    /// Propagates resolution failures of the declaring type.
    pub fn attribute_type(&self) -> Result<Option<TypeRc>> {
        self.constructor.declaring_type()
    }
}

/// A method of any origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// A `MethodDef` row
    Definition(Arc<MethodDefinition>),
    /// A definition reached through a generic instance or instantiated by a `MethodSpec`
    Bound(Arc<BoundMethod>),
    /// A runtime-provided method of a multi-dimensional array type
    Array(Arc<ArrayMethod>),
    /// Placeholder for an unresolvable reference under missing-member tolerance
    Missing(Arc<MissingMethod>),
}

impl Method {
    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Method::Definition(method) => &method.name,
            Method::Bound(method) => &method.definition.name,
            Method::Array(method) => &method.name,
            Method::Missing(method) => &method.name,
        }
    }

    /// The `MethodDef` token, null for array and missing methods.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Method::Definition(method) => method.token,
            Method::Bound(method) => method.definition.token,
            Method::Array(_) | Method::Missing(_) => Token::new(0),
        }
    }

    /// The underlying `MethodDef`, if any.
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<MethodDefinition>> {
        match self {
            Method::Definition(method) => Some(method),
            Method::Bound(method) => Some(&method.definition),
            _ => None,
        }
    }

    /// Method type arguments of an instantiated generic method.
    #[must_use]
    pub fn generic_arguments(&self) -> &[TypeRc] {
        match self {
            Method::Bound(method) => &method.method_args,
            _ => &[],
        }
    }

    /// The signature, with type arguments substituted for bound methods.
    ///
    /// # Errors
    /// Propagates failures resolving the signature of a definition.
    pub fn signature(&self) -> Result<Arc<MethodSig>> {
        match self {
            Method::Definition(method) => method.signature(),
            Method::Bound(method) => Ok(method.signature.clone()),
            Method::Array(method) => Ok(method.signature.clone()),
            Method::Missing(method) => Ok(method.signature.clone()),
        }
    }

    /// Visibility and binding.
    ///
    /// # Errors
    /// Never fails for methods; the signature matches the other member kinds.
    pub fn member_flags(&self) -> Result<MemberFlags> {
        Ok(match self {
            Method::Definition(method) => method.member_flags(),
            Method::Bound(method) => method.definition.member_flags(),
            Method::Array(_) | Method::Missing(_) => MemberFlags {
                is_public: true,
                is_static: false,
                is_non_private: true,
            },
        })
    }
}

impl HasDeclaringType for Method {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        match self {
            Method::Definition(method) => method.declaring_type(),
            Method::Bound(method) => Ok(Some(method.declaring_type.clone())),
            Method::Array(method) => Ok(Some(method.declaring_type.clone())),
            Method::Missing(method) => Ok(Some(method.owner.clone())),
        }
    }
}

/// A field of any origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// A `Field` row
    Definition(Arc<FieldDefinition>),
    /// A definition reached through a generic instance
    Bound(Arc<BoundField>),
    /// Placeholder for an unresolvable reference under missing-member tolerance
    Missing(Arc<MissingField>),
}

impl Field {
    /// The field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Field::Definition(field) => &field.name,
            Field::Bound(field) => &field.definition.name,
            Field::Missing(field) => &field.name,
        }
    }

    /// The `Field` token, null for missing fields.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Field::Definition(field) => field.token,
            Field::Bound(field) => field.definition.token,
            Field::Missing(_) => Token::new(0),
        }
    }

    /// The underlying `Field` row, if any.
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<FieldDefinition>> {
        match self {
            Field::Definition(field) => Some(field),
            Field::Bound(field) => Some(&field.definition),
            Field::Missing(_) => None,
        }
    }

    /// The field type, with type arguments substituted for bound fields.
    ///
    /// # Errors
    /// Propagates failures resolving the signature of a definition.
    pub fn field_type(&self) -> Result<TypeRc> {
        match self {
            Field::Definition(field) => field.field_type(),
            Field::Bound(field) => Ok(field.field_type.clone()),
            Field::Missing(field) => Ok(field.field_type.clone()),
        }
    }

    /// Visibility and binding.
    ///
    /// # Errors
    /// Never fails for fields; the signature matches the other member kinds.
    pub fn member_flags(&self) -> Result<MemberFlags> {
        Ok(match self {
            Field::Definition(field) => field.member_flags(),
            Field::Bound(field) => field.definition.member_flags(),
            Field::Missing(_) => MemberFlags {
                is_public: true,
                is_static: false,
                is_non_private: true,
            },
        })
    }
}

impl HasDeclaringType for Field {
    fn declaring_type(&self) -> Result<Option<TypeRc>> {
        match self {
            Field::Definition(field) => field.declaring_type(),
            Field::Bound(field) => Ok(Some(field.declaring_type.clone())),
            Field::Missing(field) => Ok(Some(field.owner.clone())),
        }
    }
}

/// Anything a metadata token can name.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// The module itself (`Module` token)
    Module(Arc<ModuleImage>),
    /// `TypeDef`, `TypeRef` or `TypeSpec`
    Type(TypeRc),
    /// `MethodDef`, a `MemberRef` naming a method, or `MethodSpec`
    Method(Method),
    /// `Field` or a `MemberRef` naming a field
    Field(Field),
    /// `Property`
    Property(Arc<PropertyDefinition>),
    /// `Event`
    Event(Arc<EventDefinition>),
    /// `Param`
    Parameter(Arc<ParameterDefinition>),
    /// `GenericParam`
    GenericParameter(TypeRc),
    /// A `#US` literal (`0x70` token)
    UserString(Arc<str>),
    /// `AssemblyRef`
    AssemblyRef(AssemblyIdentity),
    /// `ModuleRef`, by module name
    ModuleRef(Arc<str>),
}

impl Entity {
    /// The type, if this entity is one.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeRc> {
        match self {
            Entity::Type(ty) | Entity::GenericParameter(ty) => Some(ty),
            _ => None,
        }
    }

    /// The method, if this entity is one.
    #[must_use]
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Entity::Method(method) => Some(method),
            _ => None,
        }
    }

    /// The field, if this entity is one.
    #[must_use]
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Entity::Field(field) => Some(field),
            _ => None,
        }
    }
}

/// Member enumeration on resolved types.
impl Type {
    /// Types from `self` up the base chain, `self` first.
    ///
    /// Stops at the first type without a base or at a missing base type.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an inheritance chain longer than any sane image
    /// allows, which indicates a cycle.
    pub fn hierarchy(&self) -> Result<Vec<TypeRc>> {
        let mut chain = vec![Arc::new(self.clone())];
        while let Some(base) = chain.last().map(|ty| ty.base_type()).transpose()?.flatten() {
            if chain.len() >= MAX_INHERITANCE_DEPTH {
                return Err(malformed_error!(
                    "Inheritance chain of {} exceeds {} types",
                    self,
                    MAX_INHERITANCE_DEPTH
                ));
            }
            if base.is_missing() {
                break;
            }
            chain.push(base);
        }

        Ok(chain)
    }

    /// Fields declared by this type, bound to its arguments for generic instances.
    ///
    /// # Errors
    /// Propagates failures reading the field rows.
    pub fn declared_fields(&self) -> Result<Vec<Field>> {
        let Some(definition) = self.definition() else {
            return Ok(Vec::new());
        };

        let fields = definition.fields()?;
        if let Type::GenericInstance(instance) = self {
            let declaring_type = Arc::new(self.clone());
            let binder = GenericArguments::new(instance.args.clone(), Vec::new());
            fields
                .into_iter()
                .map(|field| {
                    let field_type = Type::bind(&field.field_type()?, &binder);
                    Ok(Field::Bound(Arc::new(BoundField {
                        definition: field,
                        declaring_type: declaring_type.clone(),
                        field_type,
                    })))
                })
                .collect()
        } else {
            Ok(fields.into_iter().map(Field::Definition).collect())
        }
    }

    /// Methods declared by this type, bound to its arguments for generic instances.
    ///
    /// # Errors
    /// Propagates failures reading the method rows.
    pub fn declared_methods(&self) -> Result<Vec<Method>> {
        let Some(definition) = self.definition() else {
            return Ok(Vec::new());
        };

        let methods = definition.methods()?;
        if let Type::GenericInstance(instance) = self {
            let declaring_type = Arc::new(self.clone());
            let binder = GenericArguments::new(instance.args.clone(), Vec::new());
            methods
                .into_iter()
                .map(|method| {
                    let signature = Arc::new(method.signature()?.bind(&binder));
                    Ok(Method::Bound(Arc::new(BoundMethod {
                        definition: method,
                        declaring_type: declaring_type.clone(),
                        method_args: Vec::new(),
                        signature,
                    })))
                })
                .collect()
        } else {
            Ok(methods.into_iter().map(Method::Definition).collect())
        }
    }

    /// Fields selected by `flags`, walking base types unless `DECLARED_ONLY` is set.
    ///
    /// # Errors
    /// Propagates resolution failures of fields or base types.
    pub fn get_fields(&self, flags: BindingFlags) -> Result<Vec<Field>> {
        let mut selected = Vec::new();
        for (depth, ty) in self.lookup_chain(flags)?.iter().enumerate() {
            for field in ty.declared_fields()? {
                if field.member_flags()?.matches(flags, depth > 0) {
                    selected.push(field);
                }
            }
        }

        Ok(selected)
    }

    /// Methods selected by `flags`, walking base types unless `DECLARED_ONLY` is set.
    ///
    /// Overridden base methods are not filtered out.
    ///
    /// # Errors
    /// Propagates resolution failures of methods or base types.
    pub fn get_methods(&self, flags: BindingFlags) -> Result<Vec<Method>> {
        let mut selected = Vec::new();
        for (depth, ty) in self.lookup_chain(flags)?.iter().enumerate() {
            for method in ty.declared_methods()? {
                if method.member_flags()?.matches(flags, depth > 0) {
                    selected.push(method);
                }
            }
        }

        Ok(selected)
    }

    /// Properties selected by `flags`, walking base types unless `DECLARED_ONLY` is set.
    ///
    /// # Errors
    /// Propagates resolution failures of properties, their accessors or base types.
    pub fn get_properties(&self, flags: BindingFlags) -> Result<Vec<Arc<PropertyDefinition>>> {
        let mut selected = Vec::new();
        for (depth, ty) in self.lookup_chain(flags)?.iter().enumerate() {
            let Some(definition) = ty.definition() else {
                continue;
            };
            for property in definition.properties()? {
                if property.member_flags()?.matches(flags, depth > 0) {
                    selected.push(property);
                }
            }
        }

        Ok(selected)
    }

    /// Events selected by `flags`, walking base types unless `DECLARED_ONLY` is set.
    ///
    /// # Errors
    /// Propagates resolution failures of events, their accessors or base types.
    pub fn get_events(&self, flags: BindingFlags) -> Result<Vec<Arc<EventDefinition>>> {
        let mut selected = Vec::new();
        for (depth, ty) in self.lookup_chain(flags)?.iter().enumerate() {
            let Some(definition) = ty.definition() else {
                continue;
            };
            for event in definition.events()? {
                if event.member_flags()?.matches(flags, depth > 0) {
                    selected.push(event);
                }
            }
        }

        Ok(selected)
    }

    /// The first field named `name` selected by `flags`.
    ///
    /// # Errors
    /// See [`Type::get_fields`].
    pub fn get_field(&self, name: &str, flags: BindingFlags) -> Result<Option<Field>> {
        Ok(self
            .get_fields(flags)?
            .into_iter()
            .find(|field| field.name() == name))
    }

    /// All methods named `name` selected by `flags`.
    ///
    /// # Errors
    /// See [`Type::get_methods`].
    pub fn get_methods_named(&self, name: &str, flags: BindingFlags) -> Result<Vec<Method>> {
        Ok(self
            .get_methods(flags)?
            .into_iter()
            .filter(|method| method.name() == name)
            .collect())
    }

    fn lookup_chain(&self, flags: BindingFlags) -> Result<Vec<TypeRc>> {
        if flags.contains(BindingFlags::DECLARED_ONLY) {
            Ok(vec![Arc::new(self.clone())])
        } else {
            self.hierarchy()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(is_public: bool, is_static: bool, is_non_private: bool) -> MemberFlags {
        MemberFlags {
            is_public,
            is_static,
            is_non_private,
        }
    }

    #[test]
    fn binding_selection() {
        let public_instance = flags(true, false, true);
        assert!(public_instance.matches(BindingFlags::PUBLIC | BindingFlags::INSTANCE, false));
        assert!(!public_instance.matches(BindingFlags::PUBLIC | BindingFlags::STATIC, false));
        assert!(!public_instance.matches(BindingFlags::NON_PUBLIC | BindingFlags::INSTANCE, false));
        assert!(public_instance.matches(BindingFlags::ALL, true));
    }

    #[test]
    fn inherited_members() {
        let private = flags(false, false, false);
        assert!(private.matches(BindingFlags::ALL, false));
        assert!(!private.matches(BindingFlags::ALL, true));

        let public_static = flags(true, true, true);
        assert!(!public_static.matches(BindingFlags::ALL, true));
        assert!(public_static.matches(BindingFlags::ALL | BindingFlags::FLATTEN_HIERARCHY, true));
    }

    #[test]
    fn access_mask() {
        // MethodAttributes: Private = 1, Family = 4, Public = 6
        let family = MemberFlags::from_access(4, 6, 1, false);
        assert!(!family.is_public && family.is_non_private);

        let compiler_controlled = MemberFlags::from_access(0, 6, 1, true);
        assert!(!compiler_controlled.is_non_private && compiler_controlled.is_static);

        let property = flags(false, false, true).union(flags(true, false, true));
        assert!(property.is_public);
    }
}
