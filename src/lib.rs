// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! # cilreader
//!
//! A reader for ECMA-335 CLI metadata in managed PE images. `cilreader` parses the PE headers,
//! the CLI header, the metadata root, all four heaps and every metadata table, and builds a
//! lazily resolved object model on top: types, fields, methods, parameters, properties,
//! events, generic parameters, custom attributes and manifest resources, linked across
//! modules and assemblies.
//!
//! ## Features
//!
//! - **All tables** - the 45 ECMA-335 tables, with `*Ptr` indirections honoured
//! - **Lazy resolution** - entities are created on first access and cached per row, so
//!   resolving the same token twice yields the same instance
//! - **Generics** - signatures resolve against a caller-supplied generic context; member
//!   references on generic instances bind to the instantiated declarations
//! - **Cross-assembly references** - type forwarders, satellite modules and assembly probing
//!   through a [`Universe`]
//! - **Tolerant mode** - optional placeholders for unresolvable types and members
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cilreader::prelude::*;
//!
//! let universe = Universe::new(UniverseOptions::default());
//! let assembly = universe.load_file("tests/samples/library.dll".as_ref())?;
//!
//! for ty in assembly.get_types()? {
//!     println!("{ty}");
//!     for field in ty.get_fields(BindingFlags::ALL)? {
//!         println!("    {}: {}", field.name(), field.field_type()?);
//!     }
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```
//!
//! ## Resolving tokens
//!
//! ```rust,no_run
//! use cilreader::prelude::*;
//!
//! let universe = Universe::new(UniverseOptions::tolerant());
//! let module = universe.load_module_file("tests/samples/library.dll".as_ref())?;
//!
//! match module.resolve_token(Token::new(0x0A00_0001))? {
//!     Entity::Method(method) => println!("calls {}", method.name()),
//!     Entity::Field(field) => println!("touches {}", field.name()),
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`]. Format problems surface as
//! [`Error::Malformed`] or [`Error::OutOfBounds`] at the first structure that does not parse;
//! unresolvable references surface as [`Error::TypeLoad`], [`Error::MissingField`] or
//! [`Error::MissingMethod`] unless missing-member tolerance is enabled.

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

pub(crate) mod file;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust,no_run
/// use cilreader::prelude::*;
///
/// let universe = Universe::new(UniverseOptions::default());
/// let module = universe.load_module_file("tests/samples/library.dll".as_ref())?;
/// println!("{} has {} types", module.name(), module.get_types()?.len());
/// # Ok::<(), cilreader::Error>(())
/// ```
pub mod prelude;

/// ECMA-335 metadata: headers, heaps, tables, signatures and the resolved object model.
///
/// # Key Components
///
/// - [`metadata::universe`] - loaded assemblies and the assembly loader
/// - [`metadata::assembly`] - assemblies, satellite modules and manifest resources
/// - [`metadata::module`] - module images and token resolution
/// - [`metadata::members`] - type, field, method, property and event definitions
/// - [`metadata::typesystem`] - resolved types and generic contexts
/// - [`metadata::signatures`] - signature blob decoding
/// - [`metadata::tables`] - raw rows of all metadata tables
/// - [`metadata::streams`] - the `#Strings`, `#Blob`, `#GUID` and `#US` heaps
pub mod metadata;

/// `cilreader` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cilreader` Error type
///
/// ```rust,no_run
/// use cilreader::{Error, Universe, UniverseOptions};
///
/// let universe = Universe::new(UniverseOptions::default());
/// match universe.load_file("tests/samples/crafted.dll".as_ref()) {
///     Ok(assembly) => println!("loaded {assembly}"),
///     Err(error) if error.is_bad_image_format() => println!("not a managed image: {error}"),
///     Err(Error::NotImplemented(feature)) => println!("unsupported: {feature}"),
///     Err(error) => println!("error: {error}"),
/// }
/// ```
pub use error::Error;

/// Byte-level access to images: the cursor used by every decoder, the byte source, and the
/// PE layout.
pub use file::{
    layout::{DataDirectoryEntry, ImageLayout, SectionInfo},
    parser::Parser,
    File,
};

pub use metadata::{
    assembly::AssemblyImage,
    module::ModuleImage,
    token::Token,
    universe::{Universe, UniverseOptions},
};
