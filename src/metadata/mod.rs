//! Metadata parsing and the resolved object model for managed PE images.
//!
//! The layers, bottom up:
//!
//! - [`cor20header`] and [`root`] - the CLI header and the metadata root with its stream
//!   directory
//! - [`streams`] - the `#Strings`, `#Blob`, `#GUID` and `#US` heaps
//! - [`tables`] - the `#~` stream and the raw rows of every table
//! - [`signatures`] - decoding of signature blobs into [`signatures::TypeSignature`] trees
//! - [`module`], [`assembly`], [`universe`] - loaded images and token resolution
//! - [`members`] and [`typesystem`] - the lazily built entities handed out by resolution
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilreader::{Universe, UniverseOptions};
//!
//! let universe = Universe::new(UniverseOptions::default());
//! let module = universe.load_module_file("tests/samples/library.dll".as_ref())?;
//! println!("{} ({})", module.name(), module.image_runtime_version());
//! for ty in module.get_types()? {
//!     println!("  {ty}");
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

/// Assemblies, their satellite modules and manifest resources
pub mod assembly;
/// Per-module entity caches
pub(crate) mod cache;
/// The CLI header
pub mod cor20header;
/// Assembly names, versions and strong names
pub mod identity;
/// Types, fields, methods, parameters, properties and events
pub mod members;
/// Loaded module images and token resolution
pub mod module;
/// The metadata root and stream directory
pub mod root;
/// Method, field, property and type signatures
pub mod signatures;
/// Metadata heaps
pub mod streams;
/// Metadata tables
pub mod tables;
/// Metadata tokens
pub mod token;
/// Resolved types and generic contexts
pub mod typesystem;
/// The set of loaded assemblies
pub mod universe;
