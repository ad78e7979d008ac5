//! Syntactic signature model.
//!
//! These types mirror the blob grammar of ECMA-335 §II.23.2 one to one. Type references are
//! kept as `TypeDefOrRef` tokens and generic parameters as positions; binding them to entities
//! is the resolver's job.

use crate::metadata::token::Token;

#[allow(non_snake_case)]
/// `ELEMENT_TYPE_*` constants of signature blobs (ECMA-335 §II.23.1.16).
pub mod ELEMENT_TYPE {
    /// Marks the end of a list
    pub const END: u8 = 0x00;
    /// `void`
    pub const VOID: u8 = 0x01;
    /// `bool`
    pub const BOOLEAN: u8 = 0x02;
    /// `char`
    pub const CHAR: u8 = 0x03;
    /// `int8`
    pub const I1: u8 = 0x04;
    /// `unsigned int8`
    pub const U1: u8 = 0x05;
    /// `int16`
    pub const I2: u8 = 0x06;
    /// `unsigned int16`
    pub const U2: u8 = 0x07;
    /// `int32`
    pub const I4: u8 = 0x08;
    /// `unsigned int32`
    pub const U4: u8 = 0x09;
    /// `int64`
    pub const I8: u8 = 0x0a;
    /// `unsigned int64`
    pub const U8: u8 = 0x0b;
    /// `float32`
    pub const R4: u8 = 0x0c;
    /// `float64`
    pub const R8: u8 = 0x0d;
    /// `string`
    pub const STRING: u8 = 0x0e;
    /// Unmanaged pointer, followed by a type
    pub const PTR: u8 = 0x0f;
    /// Managed pointer, followed by a type
    pub const BYREF: u8 = 0x10;
    /// Value type, followed by a `TypeDefOrRef` token
    pub const VALUETYPE: u8 = 0x11;
    /// Reference type, followed by a `TypeDefOrRef` token
    pub const CLASS: u8 = 0x12;
    /// Generic parameter of a type, followed by its position
    pub const VAR: u8 = 0x13;
    /// Multi-dimensional array
    pub const ARRAY: u8 = 0x14;
    /// Generic instantiation
    pub const GENERICINST: u8 = 0x15;
    /// `typedref`
    pub const TYPEDBYREF: u8 = 0x16;
    /// `native int`
    pub const I: u8 = 0x18;
    /// `native unsigned int`
    pub const U: u8 = 0x19;
    /// Function pointer, followed by a method signature
    pub const FNPTR: u8 = 0x1b;
    /// `object`
    pub const OBJECT: u8 = 0x1c;
    /// Single-dimensional, zero-based array
    pub const SZARRAY: u8 = 0x1d;
    /// Generic parameter of a method, followed by its position
    pub const MVAR: u8 = 0x1e;
    /// Required custom modifier
    pub const CMOD_REQD: u8 = 0x1f;
    /// Optional custom modifier
    pub const CMOD_OPT: u8 = 0x20;
    /// Implemented within the runtime
    pub const INTERNAL: u8 = 0x21;
    /// Or'd with the following element types
    pub const MODIFIER: u8 = 0x40;
    /// Sentinel for vararg method signatures
    pub const SENTINEL: u8 = 0x41;
    /// Pinned local
    pub const PINNED: u8 = 0x45;
    /// `System.Type` in custom attribute blobs
    pub const TYPE: u8 = 0x50;
    /// Boxed object in custom attribute blobs
    pub const BOXED: u8 = 0x51;
    /// Field in custom attribute blobs
    pub const FIELD: u8 = 0x53;
    /// Property in custom attribute blobs
    pub const PROPERTY: u8 = 0x54;
    /// Enum in custom attribute blobs
    pub const ENUM: u8 = 0x55;
}

#[allow(non_snake_case)]
/// Leading byte of non-type signatures (ECMA-335 §II.23.2.1 - §II.23.2.5).
pub mod SIGNATURE_HEADER {
    /// Mask for the calling convention kind
    pub const KIND_MASK: u8 = 0x0f;
    /// `default` managed calling convention
    pub const DEFAULT: u8 = 0x00;
    /// Unmanaged `cdecl`
    pub const C: u8 = 0x01;
    /// Unmanaged `stdcall`
    pub const STDCALL: u8 = 0x02;
    /// Unmanaged `thiscall`
    pub const THISCALL: u8 = 0x03;
    /// Unmanaged `fastcall`
    pub const FASTCALL: u8 = 0x04;
    /// Managed varargs
    pub const VARARG: u8 = 0x05;
    /// Field signature
    pub const FIELD: u8 = 0x06;
    /// Local variable signature
    pub const LOCAL_SIG: u8 = 0x07;
    /// Property signature
    pub const PROPERTY: u8 = 0x08;
    /// Method instantiation
    pub const GENERIC_INST: u8 = 0x0a;
    /// The method is generic, a generic parameter count follows
    pub const GENERIC: u8 = 0x10;
    /// Instance method
    pub const HAS_THIS: u8 = 0x20;
    /// `this` is passed as the first explicit parameter
    pub const EXPLICIT_THIS: u8 = 0x40;
}

/// Calling convention of a method signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CallingConvention {
    /// Managed default
    #[default]
    Default,
    /// Unmanaged `cdecl`
    C,
    /// Unmanaged `stdcall`
    StdCall,
    /// Unmanaged `thiscall`
    ThisCall,
    /// Unmanaged `fastcall`
    FastCall,
    /// Managed varargs
    VarArg,
}

/// A custom modifier attached to a parameter, return type or field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CustomModifier {
    /// `true` for `modreq`, `false` for `modopt`
    pub required: bool,
    /// The modifier type
    pub modifier: Token,
}

/// A type as written in a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeSignature {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `int8`
    I1,
    /// `unsigned int8`
    U1,
    /// `int16`
    I2,
    /// `unsigned int16`
    U2,
    /// `int32`
    I4,
    /// `unsigned int32`
    U4,
    /// `int64`
    I8,
    /// `unsigned int64`
    U8,
    /// `float32`
    R4,
    /// `float64`
    R8,
    /// `native int`
    I,
    /// `native unsigned int`
    U,
    /// `string`
    String,
    /// `object`
    Object,
    /// `typedref`
    TypedByRef,
    /// Unmanaged pointer
    Ptr(Box<TypeSignature>),
    /// Managed pointer
    ByRef(Box<TypeSignature>),
    /// Value type by `TypeDefOrRef` token
    ValueType(Token),
    /// Reference type by `TypeDefOrRef` token
    Class(Token),
    /// Generic parameter of the enclosing type, by position
    GenericParamType(u32),
    /// Generic parameter of the enclosing method, by position
    GenericParamMethod(u32),
    /// Multi-dimensional array
    Array(SignatureArray),
    /// Single-dimensional, zero-based array
    SzArray(Box<TypeSignature>),
    /// Instantiation of a generic type definition
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Function pointer
    FnPtr(Box<SignatureMethod>),
    /// Pinned local
    Pinned(Box<TypeSignature>),
}

/// Shape of a multi-dimensional array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureArray {
    /// Element type
    pub base: Box<TypeSignature>,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes of the leading dimensions that specify one
    pub sizes: Vec<u32>,
    /// Lower bounds of the leading dimensions that specify one
    pub lower_bounds: Vec<i32>,
}

/// A parameter or return type of a method signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureParameter {
    /// Custom modifiers preceding the type
    pub modifiers: Vec<CustomModifier>,
    /// `true` for a managed pointer parameter
    pub by_ref: bool,
    /// The parameter type
    pub base: TypeSignature,
}

/// `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureMethod {
    /// Instance method
    pub has_this: bool,
    /// `this` is the first explicit parameter
    pub explicit_this: bool,
    /// Calling convention kind
    pub calling_convention: CallingConvention,
    /// Number of generic parameters, 0 for non-generic methods
    pub generic_param_count: u32,
    /// Return type
    pub return_type: SignatureParameter,
    /// Fixed parameters
    pub params: Vec<SignatureParameter>,
    /// Parameters after the vararg sentinel
    pub varargs: Vec<SignatureParameter>,
}

/// `FieldSig`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureField {
    /// Custom modifiers preceding the type
    pub modifiers: Vec<CustomModifier>,
    /// The field type
    pub base: TypeSignature,
}

/// `PropertySig`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureProperty {
    /// Instance property
    pub has_this: bool,
    /// Custom modifiers preceding the type
    pub modifiers: Vec<CustomModifier>,
    /// The property type
    pub base: TypeSignature,
    /// Indexer parameters
    pub params: Vec<SignatureParameter>,
}

/// `MethodSpec` instantiation blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureMethodSpec {
    /// Type arguments of the instantiation
    pub generic_args: Vec<TypeSignature>,
}
