//! Assemblies: a manifest module plus the satellite modules and resources it lists.
//!
//! An [`AssemblyImage`] is created by the [`Universe`] for every module whose `Assembly` table
//! has a row. Satellite modules named by the manifest's `File` table are loaded from the
//! assembly's directory the first time a reference reaches them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cilreader::Universe;
//!
//! let universe = Universe::new(Default::default());
//! let assembly = universe.load_file("tests/samples/library.dll".as_ref())?;
//! println!("{}", assembly.full_name());
//! for resource in assembly.manifest_resources()? {
//!     println!("  {} {:?}", resource.name, resource.location);
//! }
//! # Ok::<(), cilreader::Error>(())
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

use dashmap::DashMap;

use crate::{
    file::File,
    metadata::{
        identity::{hash_data, AssemblyIdentity},
        members::HasCustomAttributes,
        module::ModuleImage,
        tables::{FileAttributes, FileRaw, TableId},
        token::Token,
        typesystem::TypeRc,
        universe::Universe,
    },
    Error, Result,
};

/// Token of the single `Assembly` row.
pub const ASSEMBLY_TOKEN: Token = Token(0x2000_0001);

/// Where the data of a manifest resource lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceLocation {
    /// Inside the manifest module's CLI resource section
    Embedded,
    /// In a separate file next to the assembly
    File(String),
    /// In another assembly
    Assembly(AssemblyIdentity),
}

/// A `ManifestResource` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestResource {
    /// Resource name
    pub name: Arc<str>,
    /// `ManifestResourceAttributes`
    pub flags: u32,
    /// Offset into the resource section, or into the file for file resources
    pub offset: u32,
    /// Where the bytes are
    pub location: ResourceLocation,
}

/// A loaded assembly.
pub struct AssemblyImage {
    this: Weak<AssemblyImage>,
    universe: Weak<Universe>,
    identity: AssemblyIdentity,
    manifest: Arc<ModuleImage>,
    modules: DashMap<String, Arc<ModuleImage>>,
    location: Option<PathBuf>,
}

impl AssemblyImage {
    /// Wraps `manifest` and attaches it to the new assembly.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the module has no `Assembly` row.
    pub(crate) fn new(manifest: Arc<ModuleImage>, universe: Weak<Universe>) -> Result<Arc<Self>> {
        let Some(row) = manifest.tables().assembly.get(1) else {
            return Err(malformed_error!(
                "Module {} has no Assembly row",
                manifest.name()
            ));
        };
        let identity = AssemblyIdentity::from_assembly(row, manifest.heaps())?;
        let location = manifest.location().map(Path::to_path_buf);

        tracing::debug!(
            assembly = %identity.display_name(),
            files = manifest.tables().file.row_count(),
            "registered assembly"
        );

        Ok(Arc::new_cyclic(|this: &Weak<AssemblyImage>| {
            manifest.attach(this.clone());
            AssemblyImage {
                this: this.clone(),
                universe,
                identity,
                manifest,
                modules: DashMap::new(),
                location,
            }
        }))
    }

    /// Name, version, culture and public key.
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    /// Simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Display name, e.g. `lib, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.identity.display_name()
    }

    /// The module holding the manifest.
    #[must_use]
    pub fn manifest_module(&self) -> &Arc<ModuleImage> {
        &self.manifest
    }

    /// Path of the manifest module, `None` when loaded from memory.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn universe(&self) -> Result<Arc<Universe>> {
        self.universe.upgrade().ok_or(Error::Disposed)
    }

    /// The public type `namespace.name`, following the manifest's forwarders.
    ///
    /// # Errors
    /// See [`ModuleImage::find_type`].
    pub fn find_type(&self, namespace: &str, name: &str) -> Result<Option<TypeRc>> {
        self.manifest.find_type(namespace, name)
    }

    pub(crate) fn find_type_at_depth(
        &self,
        namespace: &str,
        name: &str,
        depth: usize,
    ) -> Result<Option<TypeRc>> {
        self.manifest.find_type_at_depth(namespace, name, depth)
    }

    /// Types of every module of the assembly.
    ///
    /// # Errors
    /// Propagates module load failures.
    pub fn get_types(&self) -> Result<Vec<TypeRc>> {
        let mut types = Vec::new();
        for module in self.modules()? {
            types.extend(module.get_types()?);
        }
        Ok(types)
    }

    /// The manifest module followed by every `File` that contains metadata.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] for a satellite module missing on disk.
    pub fn modules(&self) -> Result<Vec<Arc<ModuleImage>>> {
        let mut modules = vec![self.manifest.clone()];
        for row in &self.manifest.tables().file {
            if row.flags & FileAttributes::CONTAINS_NO_META_DATA != 0 {
                continue;
            }
            let name = self.manifest.heaps().get_name(row.name)?;
            modules.push(self.module_by_name(&name)?);
        }
        Ok(modules)
    }

    fn file_row(&self, name: &str) -> Result<Option<&FileRaw>> {
        for row in &self.manifest.tables().file {
            if self
                .manifest
                .heaps()
                .get_name(row.name)?
                .eq_ignore_ascii_case(name)
            {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn sibling_path(&self, name: &str) -> Result<PathBuf> {
        match self.location.as_deref().and_then(Path::parent) {
            Some(directory) => Ok(directory.join(name)),
            None => Err(Error::FileNotFound(name.to_string())),
        }
    }

    /// The module file `name` of this assembly, loading it on first use.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the manifest lists no such file or it is not on disk,
    /// and [`Error::Malformed`] for a file flagged as containing no metadata.
    pub fn module_by_name(&self, name: &str) -> Result<Arc<ModuleImage>> {
        if name.eq_ignore_ascii_case(self.manifest.name()) {
            return Ok(self.manifest.clone());
        }

        let key = name.to_ascii_lowercase();
        if let Some(module) = self.modules.get(&key) {
            return Ok(module.clone());
        }

        let Some(row) = self.file_row(name)? else {
            return Err(Error::FileNotFound(name.to_string()));
        };
        if row.flags & FileAttributes::CONTAINS_NO_META_DATA != 0 {
            return Err(malformed_error!("File {} contains no metadata", name));
        }

        let path = self.sibling_path(name)?;
        if !path.is_file() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let module = ModuleImage::load(
            File::from_file(&path)?,
            self.universe.clone(),
            self.manifest.options().clone(),
        )?;
        module.attach(self.this.clone());

        tracing::debug!(
            assembly = self.name(),
            module = module.name(),
            "loaded satellite module"
        );

        Ok(self.modules.entry(key).or_insert(module).clone())
    }

    /// The `ManifestResource` rows of the manifest.
    ///
    /// # Errors
    /// Returns a format error for bad heap indices or an implementation in an unexpected table.
    pub fn manifest_resources(&self) -> Result<Vec<ManifestResource>> {
        let tables = self.manifest.tables();
        let heaps = self.manifest.heaps();

        let mut resources = Vec::with_capacity(tables.manifestresource.row_count() as usize);
        for row in &tables.manifestresource {
            let location = match row.implementation.tag {
                _ if row.implementation.is_null() => ResourceLocation::Embedded,
                TableId::File => match tables.file.get(row.implementation.row) {
                    Some(file) => ResourceLocation::File(heaps.get_name(file.name)?.to_string()),
                    None => {
                        return Err(malformed_error!(
                            "ManifestResource {} names File {} which does not exist",
                            row.rid,
                            row.implementation.row
                        ))
                    }
                },
                TableId::AssemblyRef => match tables.assemblyref.get(row.implementation.row) {
                    Some(reference) => ResourceLocation::Assembly(
                        AssemblyIdentity::from_assembly_ref(reference, heaps)?,
                    ),
                    None => {
                        return Err(malformed_error!(
                            "ManifestResource {} names AssemblyRef {} which does not exist",
                            row.rid,
                            row.implementation.row
                        ))
                    }
                },
                other => {
                    return Err(malformed_error!(
                        "ManifestResource {} has an implementation in table {:?}",
                        row.rid,
                        other
                    ))
                }
            };

            resources.push(ManifestResource {
                name: heaps.get_name(row.name)?,
                flags: row.flags,
                offset: row.offset,
                location,
            });
        }

        Ok(resources)
    }

    /// The bytes of the resource `name`, `None` if the manifest has no such resource.
    ///
    /// Embedded resources are a `u32` length followed by the data, at the resource's offset
    /// into the CLI resource section. Resources in other assemblies are read through the
    /// [`Universe`].
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] for a resource file or assembly that cannot be located,
    /// [`Error::RecursionLimit`] for resources forwarded through too many assemblies, and a
    /// format error for ranges outside the image.
    pub fn manifest_resource_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.resource_bytes_at_depth(name, 0)
    }

    fn resource_bytes_at_depth(&self, name: &str, depth: usize) -> Result<Option<Vec<u8>>> {
        let limit = self.manifest.options().max_forwarding_depth;
        if depth > limit {
            return Err(Error::RecursionLimit(limit));
        }

        let Some(resource) = self
            .manifest_resources()?
            .into_iter()
            .find(|resource| &*resource.name == name)
        else {
            return Ok(None);
        };

        match resource.location {
            ResourceLocation::Embedded => {
                let start = self
                    .manifest
                    .cor20_header()
                    .resource_rva
                    .checked_add(resource.offset)
                    .ok_or_else(|| malformed_error!("Resource {} offset overflows", name))?;
                let prefix = self.manifest.read_rva_bytes(start, 4)?;
                let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
                let data_rva = start
                    .checked_add(4)
                    .ok_or_else(|| malformed_error!("Resource {} offset overflows", name))?;
                Ok(Some(self.manifest.read_rva_bytes(data_rva, len as usize)?))
            }
            ResourceLocation::File(file) => {
                let path = self.sibling_path(&file)?;
                match std::fs::read(&path) {
                    Ok(data) => Ok(Some(data)),
                    Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                        Err(Error::FileNotFound(path.display().to_string()))
                    }
                    Err(error) => Err(Error::FileError(error)),
                }
            }
            ResourceLocation::Assembly(identity) => {
                let target =
                    self.universe()?
                        .load(&identity.display_name(), Some(self), true)?;
                let Some(target) = target else {
                    return Err(Error::FileNotFound(identity.display_name()));
                };
                target.resource_bytes_at_depth(name, depth + 1)
            }
        }
    }

    /// Checks the `File` row hash of `name` against the file on disk.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the manifest lists no such file or it is not on disk,
    /// and [`Error::NotImplemented`] for hash algorithms other than MD5 and SHA-1.
    pub fn verify_file_hash(&self, name: &str) -> Result<bool> {
        let Some(row) = self.file_row(name)? else {
            return Err(Error::FileNotFound(name.to_string()));
        };
        let expected = self.manifest.heaps().get_blob_copy(row.hash_value)?;
        let algorithm = self
            .manifest
            .tables()
            .assembly
            .get(1)
            .map_or(0, |assembly| assembly.hash_alg_id);

        let path = self.sibling_path(name)?;
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.display().to_string()))
            }
            Err(error) => return Err(Error::FileError(error)),
        };

        Ok(hash_data(algorithm, &data)? == expected)
    }
}

impl HasCustomAttributes for AssemblyImage {
    fn metadata_token(&self) -> Token {
        ASSEMBLY_TOKEN
    }

    fn owning_module(&self) -> Result<Arc<ModuleImage>> {
        Ok(self.manifest.clone())
    }
}

impl PartialEq for AssemblyImage {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for AssemblyImage {}

impl fmt::Debug for AssemblyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyImage")
            .field("identity", &self.identity.display_name())
            .field("manifest", &self.manifest.name())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for AssemblyImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity.display_name())
    }
}
