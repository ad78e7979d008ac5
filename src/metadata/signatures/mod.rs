//! Signature blob parsing.
//!
//! Every member of a CLI image describes its shape through a signature stored in the `#Blob`
//! heap: fields, methods, properties, standalone types (`TypeSpec`) and generic method
//! instantiations (`MethodSpec`). This module turns those blobs into [`TypeSignature`] based
//! trees. The trees stay syntactic: class references are `TypeDefOrRef` tokens and generic
//! parameters are positions. Binding them to entities happens in
//! [`crate::metadata::module`].
//!
//! # Examples
//!
//! ```rust
//! use cilreader::metadata::signatures::{parse_method_signature, TypeSignature};
//!
//! // instance int32 (string)
//! let method = parse_method_signature(&[0x20, 0x01, 0x08, 0x0E])?;
//! assert!(method.has_this);
//! assert_eq!(method.return_type.base, TypeSignature::I4);
//! assert_eq!(method.params[0].base, TypeSignature::String);
//! # Ok::<(), cilreader::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod parser;
mod types;

pub use parser::*;
pub use types::*;

use crate::Result;

/// Parse a [`SignatureMethod`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_signature(data: &[u8]) -> Result<SignatureMethod> {
    SignatureParser::new(data).parse_method_signature()
}

/// Parse a [`SignatureField`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_field_signature(data: &[u8]) -> Result<SignatureField> {
    SignatureParser::new(data).parse_field_signature()
}

/// Parse a [`SignatureProperty`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_property_signature(data: &[u8]) -> Result<SignatureProperty> {
    SignatureParser::new(data).parse_property_signature()
}

/// Parse a `TypeSpec` blob from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_type_spec_signature(data: &[u8]) -> Result<TypeSignature> {
    SignatureParser::new(data).parse_type_spec_signature()
}

/// Parse a [`SignatureMethodSpec`] from a byte slice
///
/// # Errors
/// Returns an error if the signature data is malformed or parsing fails
pub fn parse_method_spec_signature(data: &[u8]) -> Result<SignatureMethodSpec> {
    SignatureParser::new(data).parse_method_spec_signature()
}

/// Returns `true` if a member signature blob describes a field rather than a method.
///
/// `MemberRef` rows share one table for both kinds; only the leading byte tells them apart.
#[must_use]
pub fn is_field_signature(data: &[u8]) -> bool {
    data.first()
        .is_some_and(|&b| b & SIGNATURE_HEADER::KIND_MASK == SIGNATURE_HEADER::FIELD)
}
