//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust,no_run
//! use cilreader::prelude::*;
//!
//! let universe = Universe::new(UniverseOptions::default());
//! let assembly = universe.load_file("tests/samples/library.dll".as_ref())?;
//! if let Some(ty) = assembly.find_type("N", "C")? {
//!     for method in ty.get_methods(BindingFlags::ALL)? {
//!         println!("{}", method.name());
//!     }
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

// ================================================================================================
// Entry Points
// ================================================================================================

pub use crate::{AssemblyImage, Error, ModuleImage, Result, Universe, UniverseOptions};

pub use crate::{File, ImageLayout, Parser, SectionInfo};

// ================================================================================================
// Identity and Tokens
// ================================================================================================

pub use crate::metadata::token::Token;

pub use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion, StrongName};

pub use crate::metadata::assembly::{ManifestResource, ResourceLocation};

pub use crate::metadata::root::CIL_HEADER_MAGIC;

// ================================================================================================
// Resolved Object Model
// ================================================================================================

pub use crate::metadata::members::{
    ArrayMethod, BindingFlags, BoundField, BoundMethod, CustomAttribute, Entity,
    EventDefinition, Field, FieldDefinition, HasCustomAttributes, HasDeclaringType,
    HasGenericParameters, MemberFlags, Method, MethodDefinition, MissingField, MissingMethod,
    ParameterDefinition, PropertyDefinition, TypeDefinition,
};

pub use crate::metadata::typesystem::{
    ConstantValue, GenericArguments, GenericContext, MethodSig, PrimitiveKind, Type, TypeRc,
};

// ================================================================================================
// Raw Metadata
// ================================================================================================

pub use crate::metadata::tables::{CodedIndex, MetadataTables, TableId};

pub use crate::metadata::signatures::{SignatureParser, TypeSignature};

pub use crate::metadata::streams::Heaps;
