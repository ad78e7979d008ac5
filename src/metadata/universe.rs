//! The set of loaded assemblies and the loader that probes for referenced ones.
//!
//! A [`Universe`] owns every [`AssemblyImage`] it loads; modules and assemblies only hold weak
//! references back to it. Cross-assembly resolution goes through [`Universe::load`], which
//! first matches already loaded assemblies by identity and then probes the requesting
//! assembly's directory and the configured search paths for `<name>.dll` and `<name>.exe`.
//!
//! The universe also interns the placeholder types that stand for unbound method generic
//! parameters (`!!n`) while member references are matched against candidate methods.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilreader::{Universe, UniverseOptions};
//!
//! let mut options = UniverseOptions::tolerant();
//! options.search_paths.push("/usr/lib/dotnet/shared/Microsoft.NETCore.App/8.0.0".into());
//!
//! let universe = Universe::new(options);
//! let assembly = universe.load_file("app.dll".as_ref())?;
//! for ty in assembly.get_types()? {
//!     println!("{ty}");
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use dashmap::DashMap;

use crate::{
    file::File,
    metadata::{
        assembly::AssemblyImage,
        identity::AssemblyIdentity,
        module::ModuleImage,
        typesystem::{Type, TypeRc},
    },
    Error, Result,
};

const PROBE_EXTENSIONS: [&str; 2] = ["dll", "exe"];

/// Loader and resolution settings shared by every module of a [`Universe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseOptions {
    /// Substitute placeholders for types, fields and methods that cannot be resolved instead
    /// of failing
    pub missing_member_tolerance: bool,
    /// Directories probed for referenced assemblies after the requesting assembly's directory
    pub search_paths: Vec<PathBuf>,
    /// Maximum number of assemblies a type or resource may be forwarded through
    pub max_forwarding_depth: usize,
    /// Upper bound for the row count of any single table
    pub max_table_rows: u32,
    /// Upper bound for the size of any heap in bytes
    pub max_heap_size: u32,
}

impl Default for UniverseOptions {
    fn default() -> Self {
        Self {
            missing_member_tolerance: false,
            search_paths: Vec::new(),
            max_forwarding_depth: 32,
            max_table_rows: 0x00FF_FFFF,
            max_heap_size: 0x7FFF_FFFF,
        }
    }
}

impl UniverseOptions {
    /// Defaults with missing-member tolerance enabled.
    ///
    /// Unresolvable references turn into [`Type::Missing`] and the missing member
    /// placeholders, and a `warn` event is emitted for each.
    #[must_use]
    pub fn tolerant() -> Self {
        Self {
            missing_member_tolerance: true,
            ..Self::default()
        }
    }

    /// Tighter limits for untrusted input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            missing_member_tolerance: false,
            search_paths: Vec::new(),
            max_forwarding_depth: 8,
            max_table_rows: 0x0010_0000,
            max_heap_size: 0x0400_0000,
        }
    }
}

/// A set of loaded assemblies.
pub struct Universe {
    this: Weak<Universe>,
    options: UniverseOptions,
    assemblies: boxcar::Vec<Arc<AssemblyImage>>,
    modules: boxcar::Vec<Arc<ModuleImage>>,
    probed: DashMap<String, Arc<AssemblyImage>>,
    unbound_method_params: DashMap<u32, TypeRc>,
}

impl Universe {
    /// Creates an empty universe.
    #[must_use]
    pub fn new(options: UniverseOptions) -> Arc<Universe> {
        Arc::new_cyclic(|this| Universe {
            this: this.clone(),
            options,
            assemblies: boxcar::Vec::new(),
            modules: boxcar::Vec::new(),
            probed: DashMap::new(),
            unbound_method_params: DashMap::new(),
        })
    }

    /// The settings modules are loaded with.
    #[must_use]
    pub fn options(&self) -> &UniverseOptions {
        &self.options
    }

    /// Loaded assemblies in load order.
    #[must_use]
    pub fn assemblies(&self) -> Vec<Arc<AssemblyImage>> {
        self.assemblies
            .iter()
            .map(|(_, assembly)| assembly.clone())
            .collect()
    }

    /// Loads the assembly whose manifest module is the file at `path`.
    ///
    /// A file that is already loaded is returned as is.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be opened, a format error if it is not
    /// a valid image, and [`Error::Malformed`] for a module without an `Assembly` row.
    pub fn load_file(&self, path: &Path) -> Result<Arc<AssemblyImage>> {
        if let Some(existing) = self
            .assemblies
            .iter()
            .find(|(_, assembly)| assembly.location() == Some(path))
        {
            return Ok(existing.1.clone());
        }

        self.register_assembly(File::from_file(path)?)
    }

    /// Loads an assembly from an in-memory image.
    ///
    /// # Errors
    /// See [`Universe::load_file`].
    pub fn load_bytes(&self, data: Vec<u8>) -> Result<Arc<AssemblyImage>> {
        self.register_assembly(File::from_mem(data)?)
    }

    /// Loads a single module. If it carries an `Assembly` row, the assembly is registered
    /// as well and owns the module.
    ///
    /// # Errors
    /// Returns [`Error::FileError`] if the file cannot be opened and a format error if it is
    /// not a valid image.
    pub fn load_module_file(&self, path: &Path) -> Result<Arc<ModuleImage>> {
        self.register_module(File::from_file(path)?)
    }

    /// Loads a single module from an in-memory image.
    ///
    /// # Errors
    /// See [`Universe::load_module_file`].
    pub fn load_module_bytes(&self, data: Vec<u8>) -> Result<Arc<ModuleImage>> {
        self.register_module(File::from_mem(data)?)
    }

    fn register_module(&self, file: File) -> Result<Arc<ModuleImage>> {
        let module = ModuleImage::load(file, self.this.clone(), self.options.clone())?;
        if module.tables().assembly.row_count() > 0 {
            let assembly = AssemblyImage::new(module.clone(), self.this.clone())?;
            self.assemblies.push(assembly);
        } else {
            self.modules.push(module.clone());
        }
        Ok(module)
    }

    fn register_assembly(&self, file: File) -> Result<Arc<AssemblyImage>> {
        let module = ModuleImage::load(file, self.this.clone(), self.options.clone())?;
        let assembly = AssemblyImage::new(module, self.this.clone())?;
        self.assemblies.push(assembly.clone());

        tracing::debug!(
            assembly = %assembly.full_name(),
            loaded = self.assemblies.count(),
            "loaded assembly"
        );

        Ok(assembly)
    }

    /// Finds or loads the assembly `display_name`.
    ///
    /// Loaded assemblies whose identity satisfies the request are returned first. Otherwise
    /// `<name>.dll` and `<name>.exe` are probed in the directory of `requesting` and then in
    /// each search path; a probed file is accepted only if its identity satisfies the request.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for an unparsable display name and, if `throw_on_error`
    /// is set, [`Error::FileNotFound`] when no candidate is found. Without `throw_on_error`
    /// a miss is `Ok(None)`.
    pub fn load(
        &self,
        display_name: &str,
        requesting: Option<&AssemblyImage>,
        throw_on_error: bool,
    ) -> Result<Option<Arc<AssemblyImage>>> {
        let requested = AssemblyIdentity::parse(display_name)?;

        if let Some((_, found)) = self
            .assemblies
            .iter()
            .find(|(_, assembly)| assembly.identity().satisfies(&requested))
        {
            return Ok(Some(found.clone()));
        }

        let key = display_name.to_ascii_lowercase();
        if let Some(found) = self.probed.get(&key) {
            return Ok(Some(found.clone()));
        }

        let directories = requesting
            .and_then(AssemblyImage::location)
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .into_iter()
            .chain(self.options.search_paths.iter().cloned());

        for directory in directories {
            for extension in PROBE_EXTENSIONS {
                let candidate = directory.join(format!("{}.{extension}", requested.name));
                if !candidate.is_file() {
                    continue;
                }

                let assembly = self.load_file(&candidate)?;
                if assembly.identity().satisfies(&requested) {
                    tracing::debug!(
                        requested = display_name,
                        path = %candidate.display(),
                        "resolved assembly reference"
                    );
                    return Ok(Some(self.probed.entry(key).or_insert(assembly).clone()));
                }

                tracing::debug!(
                    requested = display_name,
                    found = %assembly.full_name(),
                    "probed assembly does not satisfy the reference"
                );
            }
        }

        if throw_on_error {
            return Err(Error::FileNotFound(display_name.to_string()));
        }

        tracing::warn!(requested = display_name, "assembly not found");
        Ok(None)
    }

    /// The interned placeholder for method generic parameter `position`.
    #[must_use]
    pub fn unbound_method_parameter(&self, position: u32) -> TypeRc {
        self.unbound_method_params
            .entry(position)
            .or_insert_with(|| Arc::new(Type::UnboundMethodParameter(position)))
            .clone()
    }
}

impl std::fmt::Debug for Universe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Universe")
            .field("options", &self.options)
            .field("assemblies", &self.assemblies.count())
            .field("modules", &self.modules.count())
            .finish_non_exhaustive()
    }
}
