//! The resolved type model.
//!
//! Signature blobs only carry tokens and element type bytes. Resolution turns them into
//! [`Type`] values: built-in primitives, type definitions of some loaded module, and the
//! constructed types (pointers, arrays, generic instances) built from them.
//!
//! Equality of types is identity for definitions and generic parameters (same module, same
//! row) and structural for everything constructed on top of them, so `List<int>` resolved
//! twice compares equal even when the two results are different allocations.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use cilreader::metadata::typesystem::{PrimitiveKind, Type};
//!
//! let element = Arc::new(Type::Primitive(PrimitiveKind::I4));
//! let array = Type::SzArray(element);
//! assert_eq!(array.full_name(), "System.Int32[]");
//! ```

mod generics;
mod primitives;

pub use generics::{
    GenericArguments, GenericContext, GenericTypeParameter, TrackingGenericContext, TypeBinder,
};
pub use primitives::{ConstantValue, PrimitiveKind};

use std::{fmt, sync::Arc};

use crate::{
    metadata::{members::TypeDefinition, signatures::CallingConvention},
    Result,
};

/// Shared handle to a resolved type.
pub type TypeRc = Arc<Type>;

/// A resolved type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// A built-in type with its own element type byte
    Primitive(PrimitiveKind),
    /// A `TypeDef` row of some loaded module
    Definition(Arc<TypeDefinition>),
    /// Unmanaged pointer, `T*`
    Pointer(TypeRc),
    /// Managed reference, `T&`
    ByRef(TypeRc),
    /// Single-dimensional zero-based array, `T[]`
    SzArray(TypeRc),
    /// General array with rank and optional bounds
    Array(ArrayType),
    /// A generic type definition instantiated with type arguments
    GenericInstance(GenericInstance),
    /// A formal parameter of a type or method definition
    GenericParameter(Arc<GenericTypeParameter>),
    /// A method type parameter position not tied to any definition
    ///
    /// Used when a member reference names a generic method: `!!0` in its signature cannot be
    /// bound to a definition until the member is found.
    UnboundMethodParameter(u32),
    /// Function pointer with its signature
    FunctionPointer(Box<MethodSig>),
    /// Placeholder for a type that could not be resolved, under missing-member tolerance
    Missing(Arc<MissingType>),
}

/// Shape of a general array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayType {
    /// The element type
    pub element: TypeRc,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes of the leading dimensions that specify one
    pub sizes: Vec<u32>,
    /// Lower bounds of the leading dimensions that specify one
    pub lower_bounds: Vec<i32>,
}

/// A generic type applied to arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenericInstance {
    /// The generic definition; a [`Type::Definition`] or a [`Type::Missing`]
    pub definition: TypeRc,
    /// One argument per generic parameter of the definition
    pub args: Vec<TypeRc>,
}

/// Identity of a type that failed to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MissingType {
    /// Namespace of the reference
    pub namespace: String,
    /// Name of the reference
    pub name: String,
    /// Display name of the scope the type was looked up in
    pub scope: String,
}

/// A method signature with all types resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSig {
    /// Instance method
    pub has_this: bool,
    /// `this` is the first explicit parameter
    pub explicit_this: bool,
    /// Calling convention
    pub calling_convention: CallingConvention,
    /// Number of generic parameters of the method
    pub generic_param_count: u32,
    /// The return type, `System.Void` for none
    pub return_type: TypeRc,
    /// Declared parameter types; by-ref parameters are [`Type::ByRef`]
    pub params: Vec<TypeRc>,
    /// Extra arguments after the vararg sentinel of a call site
    pub varargs: Vec<TypeRc>,
}

impl MethodSig {
    /// Substitutes generic parameters in every type of the signature.
    #[must_use]
    pub fn bind(&self, binder: &dyn TypeBinder) -> MethodSig {
        MethodSig {
            has_this: self.has_this,
            explicit_this: self.explicit_this,
            calling_convention: self.calling_convention,
            generic_param_count: self.generic_param_count,
            return_type: Type::bind(&self.return_type, binder),
            params: self
                .params
                .iter()
                .map(|param| Type::bind(param, binder))
                .collect(),
            varargs: self
                .varargs
                .iter()
                .map(|param| Type::bind(param, binder))
                .collect(),
        }
    }

    /// Compares the parts that identify a method: instance-ness, generic arity, return and
    /// parameter types. Call-site varargs are ignored.
    #[must_use]
    pub fn matches(&self, other: &MethodSig) -> bool {
        self.has_this == other.has_this
            && self.generic_param_count == other.generic_param_count
            && self.return_type == other.return_type
            && self.params == other.params
    }
}

impl Type {
    /// Wraps `kind` in a new handle.
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> TypeRc {
        Arc::new(Type::Primitive(kind))
    }

    /// Simple name; constructed types append their suffix, e.g. `Int32[]`.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Type::Primitive(kind) => kind.name().to_string(),
            Type::Definition(definition) => definition.name.to_string(),
            Type::GenericInstance(instance) => instance.definition.name(),
            Type::GenericParameter(param) => param.name.to_string(),
            Type::Missing(missing) => missing.name.clone(),
            _ => self.to_string(),
        }
    }

    /// Namespace of the type or of its innermost element type.
    #[must_use]
    pub fn namespace(&self) -> String {
        match self {
            Type::Primitive(_) => "System".to_string(),
            Type::Definition(definition) => definition.namespace.to_string(),
            Type::Pointer(element) | Type::ByRef(element) | Type::SzArray(element) => {
                element.namespace()
            }
            Type::Array(array) => array.element.namespace(),
            Type::GenericInstance(instance) => instance.definition.namespace(),
            Type::Missing(missing) => missing.namespace.clone(),
            Type::GenericParameter(_)
            | Type::UnboundMethodParameter(_)
            | Type::FunctionPointer(_) => String::new(),
        }
    }

    /// Namespace-qualified name including the constructed suffixes; nested definitions use
    /// `Outer+Inner`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }

    /// The underlying definition of a definition or generic instance.
    #[must_use]
    pub fn definition(&self) -> Option<&Arc<TypeDefinition>> {
        match self {
            Type::Definition(definition) => Some(definition),
            Type::GenericInstance(instance) => instance.definition.definition(),
            _ => None,
        }
    }

    /// The primitive kind, for built-in types.
    #[must_use]
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Element type of pointers, references and arrays.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeRc> {
        match self {
            Type::Pointer(element) | Type::ByRef(element) | Type::SzArray(element) => {
                Some(element)
            }
            Type::Array(array) => Some(&array.element),
            _ => None,
        }
    }

    /// Arguments of a generic instance, empty otherwise.
    #[must_use]
    pub fn generic_arguments(&self) -> &[TypeRc] {
        match self {
            Type::GenericInstance(instance) => &instance.args,
            _ => &[],
        }
    }

    /// `true` for placeholders synthesized under missing-member tolerance.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Type::Missing(_))
    }

    /// `true` if any generic parameter occurs in the type.
    #[must_use]
    pub fn contains_generic_parameters(&self) -> bool {
        match self {
            Type::GenericParameter(_) | Type::UnboundMethodParameter(_) => true,
            Type::Pointer(element) | Type::ByRef(element) | Type::SzArray(element) => {
                element.contains_generic_parameters()
            }
            Type::Array(array) => array.element.contains_generic_parameters(),
            Type::GenericInstance(instance) => instance
                .args
                .iter()
                .any(|arg| arg.contains_generic_parameters()),
            Type::FunctionPointer(sig) => {
                sig.return_type.contains_generic_parameters()
                    || sig.params.iter().any(|p| p.contains_generic_parameters())
            }
            _ => false,
        }
    }

    /// `true` for value types. Definitions are value types when they derive from
    /// `System.ValueType` or `System.Enum`.
    ///
    /// # Errors
    /// Propagates failures resolving the base type of a definition.
    pub fn is_value_type(&self) -> Result<bool> {
        match self {
            Type::Primitive(kind) => Ok(kind.is_value_type()),
            Type::Definition(definition) => definition.is_value_type(),
            Type::GenericInstance(instance) => instance.definition.is_value_type(),
            Type::Pointer(_) | Type::FunctionPointer(_) => Ok(true),
            _ => Ok(false),
        }
    }

    /// The base type. For a generic instance this is the definition's base bound to the
    /// instance's arguments.
    ///
    /// # Errors
    /// Propagates resolution failures of the `extends` column.
    pub fn base_type(&self) -> Result<Option<TypeRc>> {
        match self {
            Type::Definition(definition) => definition.base_type(),
            Type::GenericInstance(instance) => {
                let Some(definition) = instance.definition.definition() else {
                    return Ok(None);
                };
                let binder = GenericArguments::new(instance.args.clone(), Vec::new());
                Ok(definition
                    .base_type()?
                    .map(|base| Type::bind(&base, &binder)))
            }
            _ => Ok(None),
        }
    }

    /// Substitutes generic parameters through `binder`.
    ///
    /// Returns `this` itself when nothing was substituted.
    #[must_use]
    pub fn bind(this: &TypeRc, binder: &dyn TypeBinder) -> TypeRc {
        let rebuild = |element: &TypeRc, wrap: fn(TypeRc) -> Type| {
            let bound = Type::bind(element, binder);
            if Arc::ptr_eq(&bound, element) {
                this.clone()
            } else {
                Arc::new(wrap(bound))
            }
        };

        match this.as_ref() {
            Type::GenericParameter(param) => {
                let bound = if param.is_method_parameter() {
                    binder.bind_method_parameter(param.number)
                } else {
                    binder.bind_type_parameter(param.number)
                };
                bound.unwrap_or_else(|| this.clone())
            }
            Type::UnboundMethodParameter(position) => binder
                .bind_method_parameter(*position)
                .unwrap_or_else(|| this.clone()),
            Type::Pointer(element) => rebuild(element, Type::Pointer),
            Type::ByRef(element) => rebuild(element, Type::ByRef),
            Type::SzArray(element) => rebuild(element, Type::SzArray),
            Type::Array(array) => {
                let element = Type::bind(&array.element, binder);
                if Arc::ptr_eq(&element, &array.element) {
                    this.clone()
                } else {
                    Arc::new(Type::Array(ArrayType {
                        element,
                        ..array.clone()
                    }))
                }
            }
            Type::GenericInstance(instance) => {
                let args: Vec<TypeRc> = instance
                    .args
                    .iter()
                    .map(|arg| Type::bind(arg, binder))
                    .collect();
                if args
                    .iter()
                    .zip(&instance.args)
                    .all(|(bound, arg)| Arc::ptr_eq(bound, arg))
                {
                    this.clone()
                } else {
                    Arc::new(Type::GenericInstance(GenericInstance {
                        definition: instance.definition.clone(),
                        args,
                    }))
                }
            }
            Type::FunctionPointer(sig) if this.contains_generic_parameters() => {
                Arc::new(Type::FunctionPointer(Box::new(sig.bind(binder))))
            }
            _ => this.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{kind}"),
            Type::Definition(definition) => write!(f, "{}", definition.full_name()),
            Type::Pointer(element) => write!(f, "{element}*"),
            Type::ByRef(element) => write!(f, "{element}&"),
            Type::SzArray(element) => write!(f, "{element}[]"),
            Type::Array(array) => {
                if array.rank == 1 {
                    write!(f, "{}[*]", array.element)
                } else {
                    let commas = ",".repeat(array.rank.saturating_sub(1) as usize);
                    write!(f, "{}[{commas}]", array.element)
                }
            }
            Type::GenericInstance(instance) => {
                write!(f, "{}[", instance.definition)?;
                for (index, arg) in instance.args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, "]")
            }
            Type::GenericParameter(param) => write!(f, "{}", param.name),
            Type::UnboundMethodParameter(position) => write!(f, "!!{position}"),
            Type::FunctionPointer(sig) => {
                write!(f, "{} *(", sig.return_type)?;
                for (index, param) in sig.params.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
            Type::Missing(missing) => {
                if missing.namespace.is_empty() {
                    write!(f, "{}", missing.name)
                } else {
                    write!(f, "{}.{}", missing.namespace, missing.name)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32() -> TypeRc {
        Type::primitive(PrimitiveKind::I4)
    }

    #[test]
    fn constructed_names() {
        let array = Type::Array(ArrayType {
            element: int32(),
            rank: 2,
            sizes: vec![],
            lower_bounds: vec![],
        });
        assert_eq!(array.full_name(), "System.Int32[,]");
        assert_eq!(array.namespace(), "System");

        let pointer = Type::Pointer(Type::primitive(PrimitiveKind::U1));
        assert_eq!(pointer.full_name(), "System.Byte*");
        assert_eq!(pointer.element_type().unwrap().as_primitive(), Some(PrimitiveKind::U1));

        let missing = Type::Missing(Arc::new(MissingType {
            namespace: "N".into(),
            name: "Gone".into(),
            scope: "lib".into(),
        }));
        assert_eq!(missing.full_name(), "N.Gone");
        assert!(missing.is_missing());
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Type::SzArray(int32()), Type::SzArray(int32()));
        assert_ne!(
            Type::SzArray(int32()),
            Type::ByRef(Type::primitive(PrimitiveKind::I4))
        );
    }

    #[test]
    fn bind_unbound_method_parameter() {
        let generic = Arc::new(Type::SzArray(Arc::new(Type::UnboundMethodParameter(0))));
        assert!(generic.contains_generic_parameters());

        let binder = GenericArguments::new(vec![], vec![int32()]);
        let bound = Type::bind(&generic, &binder);
        assert_eq!(bound.full_name(), "System.Int32[]");
        assert!(!bound.contains_generic_parameters());

        let untouched = Arc::new(Type::SzArray(int32()));
        assert!(Arc::ptr_eq(&Type::bind(&untouched, &binder), &untouched));

        let unbindable = Type::bind(&generic, &GenericArguments::none());
        assert!(Arc::ptr_eq(&unbindable, &generic));
    }

    #[test]
    fn method_sig_matching_ignores_varargs() {
        let declared = MethodSig {
            has_this: false,
            explicit_this: false,
            calling_convention: CallingConvention::VarArg,
            generic_param_count: 0,
            return_type: Type::primitive(PrimitiveKind::Void),
            params: vec![int32()],
            varargs: vec![],
        };
        let call_site = MethodSig {
            varargs: vec![Type::primitive(PrimitiveKind::String)],
            ..declared.clone()
        };
        assert!(declared.matches(&call_site));

        let other = MethodSig {
            params: vec![],
            ..declared.clone()
        };
        assert!(!declared.matches(&other));
    }
}
