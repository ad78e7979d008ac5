use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three groups that callers usually treat differently:
///
/// ## Image format errors
/// - [`Error::Malformed`] - a signature, tag, or heap reference is invalid
/// - [`Error::OutOfBounds`] - the data ended before a structure was complete
/// - [`Error::GoblinErr`] - the PE header parser rejected the image
/// - [`Error::Empty`] - zero-length input
///
/// These are deterministic for a given input and never recoverable; see
/// [`Error::is_bad_image_format`].
///
/// ## Unsupported features
/// - [`Error::NotImplemented`] - the image is valid but uses a feature this reader does not support
///
/// ## Resolution errors
/// - [`Error::TypeLoad`], [`Error::MissingField`], [`Error::MissingMethod`] - a cross reference
///   could not be bound to its target. With
///   [`crate::UniverseOptions::missing_member_tolerance`] enabled, placeholders are returned instead.
/// - [`Error::FileNotFound`] - a referenced module, resource file, or assembly is not on disk
/// - [`Error::Disposed`] - the module was disposed before the call
///
/// # Examples
///
/// ```rust,no_run
/// use cilreader::{Error, Universe, UniverseOptions};
/// use std::path::Path;
///
/// let universe = Universe::new(UniverseOptions::default());
/// match universe.load_file(Path::new("assembly.dll")) {
///     Ok(assembly) => println!("Loaded {}", assembly.full_name()),
///     Err(e) if e.is_bad_image_format() => eprintln!("Not a valid CLI image: {e}"),
///     Err(Error::NotImplemented(feature)) => eprintln!("Unsupported: {feature}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The image is well-formed but relies on a feature this reader does not implement.
    ///
    /// The legacy `ParamPtr` indirection table is the canonical example.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the PE header parser.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// A type reference could not be bound to a type in its resolution scope.
    #[error("Could not load type '{type_name}' from '{scope}'")]
    TypeLoad {
        /// Full name of the type that was requested
        type_name: String,
        /// The module or assembly that was searched
        scope: String,
    },

    /// A field reference did not match any field of its owner type or its base types.
    #[error("Field not found: {owner}::{name}")]
    MissingField {
        /// Full name of the owner type
        owner: String,
        /// Name of the missing field
        name: String,
    },

    /// A method reference did not match any method of its owner type or its base types.
    #[error("Method not found: {owner}::{name}")]
    MissingMethod {
        /// Full name of the owner type
        owner: String,
        /// Name of the missing method
        name: String,
    },

    /// A module, resource file, or assembly could not be located.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The module backing this entity has been disposed.
    #[error("The module has been disposed")]
    Disposed,

    /// Recursion depth limit reached while following nested signatures or type forwarders.
    #[error("Reached the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to acquire a lock around shared state.
    #[error("Failed to acquire lock")]
    LockError,
}

impl Error {
    /// Returns `true` for errors that mean the input is not a well-formed CLI image.
    ///
    /// This groups the truncated-data, signature-mismatch and invalid-reference failures that
    /// abort a module load, as opposed to resolution failures of individual tokens.
    #[must_use]
    pub fn is_bad_image_format(&self) -> bool {
        matches!(
            self,
            Error::Malformed { .. }
                | Error::OutOfBounds { .. }
                | Error::GoblinErr(_)
                | Error::Empty
        )
    }

    /// Returns `true` for failures to bind a cross reference to its target.
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Error::TypeLoad { .. } | Error::MissingField { .. } | Error::MissingMethod { .. }
        )
    }
}
