//! Assembly names: identity, display-name formatting and parsing, strong-name tokens.
//!
//! Assemblies refer to each other through `AssemblyRef` rows, and the loader looks them up by
//! display name:
//!
//! ```text
//! Name, Version=M.m.b.r, Culture=neutral|<culture>, PublicKeyToken=<hex>|null
//! ```
//!
//! A strong name is stored either as the full public key or as the 8-byte public key token. The
//! token is the last 8 bytes of the SHA-1 hash of the key, in reverse order.
//!
//! ```rust
//! use cilreader::metadata::identity::AssemblyIdentity;
//!
//! let identity = AssemblyIdentity::parse(
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
//! )?;
//! assert_eq!(identity.name, "mscorlib");
//! assert_eq!(identity.version.to_string(), "4.0.0.0");
//! assert_eq!(
//!     identity.display_name(),
//!     "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
//! );
//! # Ok::<(), cilreader::Error>(())
//! ```

use std::fmt;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{
    metadata::{
        streams::Heaps,
        tables::{AssemblyFlags, AssemblyHashAlgorithm, AssemblyRaw, AssemblyRefRaw},
    },
    Result,
};

/// Four-part assembly version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its four components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// `0.0.0.0`, used when a request does not specify a version.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        *self == AssemblyVersion::default()
    }

    /// Parses `M[.m[.b[.r]]]`; missing components are 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for more than four components or a component that is
    /// not a `u16`.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .trim()
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Strong-name part of an assembly identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StrongName {
    /// The full public key blob
    PublicKey(Vec<u8>),
    /// The 8-byte public key token
    Token([u8; 8]),
}

impl StrongName {
    /// The public key token, derived from the key when necessary.
    #[must_use]
    pub fn token(&self) -> [u8; 8] {
        match self {
            StrongName::PublicKey(key) => public_key_token(key),
            StrongName::Token(token) => *token,
        }
    }
}

/// Computes the public key token of `public_key`: the last 8 bytes of its SHA-1 hash, reversed.
#[must_use]
pub fn public_key_token(public_key: &[u8]) -> [u8; 8] {
    let hash = Sha1::digest(public_key);

    let mut token = [0u8; 8];
    for (i, byte) in hash.iter().rev().take(8).enumerate() {
        token[i] = *byte;
    }
    token
}

/// Hashes `data` with an `AssemblyHashAlgorithm`, as used by `File` and `AssemblyRef` hash
/// values.
///
/// # Errors
/// Returns [`crate::Error::NotImplemented`] for algorithms other than MD5 and SHA-1.
pub fn hash_data(algorithm: u32, data: &[u8]) -> Result<Vec<u8>> {
    match algorithm {
        AssemblyHashAlgorithm::MD5 => Ok(Md5::digest(data).to_vec()),
        AssemblyHashAlgorithm::SHA1 => Ok(Sha1::digest(data).to_vec()),
        other => Err(crate::Error::NotImplemented(format!(
            "hash algorithm {other:#x}"
        ))),
    }
}

/// Name, version, culture and strong name of an assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple name
    pub name: String,
    /// Version
    pub version: AssemblyVersion,
    /// Culture, `None` for culture-neutral assemblies
    pub culture: Option<String>,
    /// Public key or token, `None` for assemblies without a strong name
    pub strong_name: Option<StrongName>,
    /// `AssemblyFlags`
    pub flags: u32,
}

impl AssemblyIdentity {
    /// Creates an identity without strong name.
    #[must_use]
    pub fn new(name: &str, version: AssemblyVersion, culture: Option<&str>) -> Self {
        AssemblyIdentity {
            name: name.to_string(),
            version,
            culture: culture.map(ToString::to_string),
            strong_name: None,
            flags: 0,
        }
    }

    /// Builds the identity described by the `Assembly` row of a manifest module.
    ///
    /// # Errors
    /// Returns an error if a heap index of the row is invalid.
    pub fn from_assembly(row: &AssemblyRaw, heaps: &Heaps) -> Result<Self> {
        let public_key = heaps.get_blob_copy(row.public_key)?;

        Ok(AssemblyIdentity {
            name: heaps.get_name(row.name)?.to_string(),
            version: AssemblyVersion::new(
                row.major_version,
                row.minor_version,
                row.build_number,
                row.revision_number,
            ),
            culture: culture(heaps, row.culture)?,
            strong_name: (!public_key.is_empty()).then_some(StrongName::PublicKey(public_key)),
            flags: row.flags,
        })
    }

    /// Builds the identity requested by an `AssemblyRef` row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a token blob is not 8 bytes long, or an error if a
    /// heap index is invalid.
    pub fn from_assembly_ref(row: &AssemblyRefRaw, heaps: &Heaps) -> Result<Self> {
        let blob = heaps.get_blob_copy(row.public_key_or_token)?;
        let strong_name = if blob.is_empty() {
            None
        } else if row.flags & AssemblyFlags::PUBLIC_KEY != 0 {
            Some(StrongName::PublicKey(blob))
        } else {
            let token: [u8; 8] = blob.as_slice().try_into().map_err(|_| {
                malformed_error!(
                    "AssemblyRef {} - public key token has {} bytes",
                    row.rid,
                    blob.len()
                )
            })?;
            Some(StrongName::Token(token))
        };

        Ok(AssemblyIdentity {
            name: heaps.get_name(row.name)?.to_string(),
            version: AssemblyVersion::new(
                row.major_version,
                row.minor_version,
                row.build_number,
                row.revision_number,
            ),
            culture: culture(heaps, row.culture)?,
            strong_name,
            flags: row.flags,
        })
    }

    /// Parses a display name.
    ///
    /// Both `PublicKeyToken=` and `PublicKey=` are accepted; unknown keys are ignored.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an empty name, a bad version, or bad hex.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = AssemblyIdentity::new(name, AssemblyVersion::default(), None);
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                return Err(malformed_error!("Invalid display name component: {}", part));
            };
            let value = value.trim();

            match key.trim() {
                "Version" => identity.version = AssemblyVersion::parse(value)?,
                "Culture" => {
                    if !value.eq_ignore_ascii_case("neutral") && !value.is_empty() {
                        identity.culture = Some(value.to_string());
                    }
                }
                "PublicKeyToken" => {
                    if !value.eq_ignore_ascii_case("null") && !value.is_empty() {
                        let bytes = hex::decode(value).map_err(|e| {
                            malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e)
                        })?;
                        let token: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                            malformed_error!(
                                "PublicKeyToken must be 8 bytes, got {} from '{}'",
                                bytes.len(),
                                value
                            )
                        })?;
                        identity.strong_name = Some(StrongName::Token(token));
                    }
                }
                "PublicKey" => {
                    if !value.eq_ignore_ascii_case("null") && !value.is_empty() {
                        let bytes = hex::decode(value).map_err(|e| {
                            malformed_error!("Invalid hex in PublicKey '{}': {}", value, e)
                        })?;
                        identity.strong_name = Some(StrongName::PublicKey(bytes));
                        identity.flags |= AssemblyFlags::PUBLIC_KEY;
                    }
                }
                _ => {}
            }
        }

        Ok(identity)
    }

    /// The public key token, `None` without strong name.
    #[must_use]
    pub fn public_key_token(&self) -> Option<[u8; 8]> {
        self.strong_name.as_ref().map(StrongName::token)
    }

    /// Formats `Name, Version=M.m.b.r, Culture=c, PublicKeyToken=t`.
    #[must_use]
    pub fn display_name(&self) -> String {
        let token = self
            .public_key_token()
            .map_or_else(|| "null".to_string(), hex::encode);

        format!(
            "{}, Version={}, Culture={}, PublicKeyToken={}",
            self.name,
            self.version,
            self.culture.as_deref().unwrap_or("neutral"),
            token
        )
    }

    /// Returns `true` if an assembly with this identity can serve `requested`.
    ///
    /// Names compare case-insensitively, cultures exactly. The version must be at least the
    /// requested one unless the request leaves it unspecified, and tokens must agree when both
    /// sides have one.
    #[must_use]
    pub fn satisfies(&self, requested: &AssemblyIdentity) -> bool {
        if !self.name.eq_ignore_ascii_case(&requested.name) {
            return false;
        }

        let culture = |c: &Option<String>| c.as_deref().map(str::to_ascii_lowercase);
        if culture(&self.culture) != culture(&requested.culture) {
            return false;
        }

        if !requested.version.is_unknown() && self.version < requested.version {
            return false;
        }

        match (self.public_key_token(), requested.public_key_token()) {
            (Some(own), Some(wanted)) => own == wanted,
            _ => true,
        }
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn culture(heaps: &Heaps, index: u32) -> Result<Option<String>> {
    Ok(heaps
        .get_string(index)?
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("neutral"))
        .map(|c| c.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    // ECMA standard public key, whose token is b77a5c561934e089
    const ECMA_KEY: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn token_of_ecma_key() {
        assert_eq!(
            hex::encode(public_key_token(&ECMA_KEY)),
            "b77a5c561934e089"
        );
        assert_eq!(
            StrongName::PublicKey(ECMA_KEY.to_vec()).token(),
            StrongName::Token([0xb7, 0x7a, 0x5c, 0x56, 0x19, 0x34, 0xe0, 0x89]).token()
        );
    }

    #[test]
    fn parse_and_format() {
        let identity = AssemblyIdentity::parse("Lib").unwrap();
        assert_eq!(identity.name, "Lib");
        assert!(identity.version.is_unknown());
        assert_eq!(
            identity.display_name(),
            "Lib, Version=0.0.0.0, Culture=neutral, PublicKeyToken=null"
        );

        let identity =
            AssemblyIdentity::parse("Lib.Res, Version=1.2.3.4, Culture=de-DE, PublicKeyToken=null")
                .unwrap();
        assert_eq!(identity.version, AssemblyVersion::new(1, 2, 3, 4));
        assert_eq!(identity.culture.as_deref(), Some("de-DE"));
        assert!(identity.strong_name.is_none());

        let identity = AssemblyIdentity::parse(&format!(
            "mscorlib, Version=4.0.0.0, PublicKey={}",
            hex::encode(ECMA_KEY)
        ))
        .unwrap();
        assert_eq!(
            identity.display_name(),
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089"
        );
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(
            AssemblyIdentity::parse(""),
            Err(Error::Malformed { .. })
        ));
        assert!(AssemblyIdentity::parse("A, Version=1.x").is_err());
        assert!(AssemblyIdentity::parse("A, PublicKeyToken=abcd").is_err());
        assert!(AssemblyIdentity::parse("A, PublicKeyToken=zz").is_err());
        assert!(AssemblyIdentity::parse("A, Version").is_err());
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn satisfies() {
        let loaded = AssemblyIdentity::parse(
            "mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
        )
        .unwrap();

        assert!(loaded.satisfies(&AssemblyIdentity::parse("MSCORLIB").unwrap()));
        assert!(loaded.satisfies(&AssemblyIdentity::parse("mscorlib, Version=2.0.0.0").unwrap()));
        assert!(!loaded.satisfies(&AssemblyIdentity::parse("mscorlib, Version=4.0.0.1").unwrap()));
        assert!(!loaded.satisfies(
            &AssemblyIdentity::parse("mscorlib, PublicKeyToken=0000000000000000").unwrap()
        ));
        assert!(!loaded.satisfies(&AssemblyIdentity::parse("mscorlib, Culture=fr").unwrap()));
        assert!(!loaded.satisfies(&AssemblyIdentity::parse("System").unwrap()));
    }

    #[test]
    fn file_hashes() {
        assert_eq!(
            hex::encode(hash_data(AssemblyHashAlgorithm::SHA1, b"abc").unwrap()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex::encode(hash_data(AssemblyHashAlgorithm::MD5, b"abc").unwrap()),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert!(matches!(
            hash_data(0x800C, b"abc"),
            Err(Error::NotImplemented(_))
        ));
    }
}
