use std::path::PathBuf;

use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::surface::{CapabilityKind, ModuleType};

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

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is fatal to the generation pass of the module that raised it. Nothing is
/// retried; the caller (usually a platform build driver) decides whether to abort the whole
/// build or skip the module. [`Error::category`] groups the variants the same way a build
/// driver reasons about them.
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::CyclicDependency`] - Library instances depend on each other in a loop
/// - [`Error::EntryPointCount`] - Wrong number of entry points for the module type
/// - [`Error::DriverModelMismatch`] - Driver-model protocol groups of different sizes
/// - [`Error::LibraryInstanceNotFound`] - A referenced library instance is not registered
/// - [`Error::ModuleNotFound`] - A requested module is not registered
/// - [`Error::PackageNotFound`] - A dependent package is not registered
/// - [`Error::LibraryClassNotFound`] - No package declares a header for a library class
///
/// ## Resolution Errors
/// - [`Error::DeclarationNotFound`] - A PPI/protocol/GUID keyword is declared by no package
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::ReadFailed`] / [`Error::WriteFailed`] - Output file access failures
/// - [`Error::FlashMapMissing`] - Legacy flash-map source header is missing
///
/// ## Workspace Errors
/// - [`Error::Malformed`] - Structurally invalid workspace document
/// - [`Error::Xml`] - Low level XML syntax errors from quick-xml
/// - [`Error::InvalidGuid`], [`Error::ModuleTypeUnknown`], [`Error::ArchUnknown`]
///
/// # Examples
///
/// ```rust,ignore
/// use tianogen::{AutoGen, Error};
///
/// match autogen.generate(module, arch, &out, &pcd) {
///     Ok(report) => println!("{report}"),
///     Err(Error::DeclarationNotFound { kind, keyword }) => {
///         eprintln!("{kind} '{keyword}' is not declared by any dependent package");
///     }
///     Err(e) => eprintln!("generation failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A cycle was found while ordering library instances.
    ///
    /// The payload holds the instance names along the cycle, starting and ending with the
    /// same instance.
    #[error("Cyclic library instance dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// The module type demands exactly one entry point but a different number was declared.
    #[error("Module type = '{module_type}', can have only one module entry point, found {found}")]
    EntryPointCount {
        /// Declared module type
        module_type: ModuleType,
        /// Number of distinct entry points that were declared
        found: usize,
    },

    /// A driver-model protocol group does not line up with the driver-binding group.
    #[error("Different number of Driver Binding and {group} protocols: expected {expected}, found {found}")]
    DriverModelMismatch {
        /// Name of the offending group
        group: &'static str,
        /// Number of driver-binding instances
        expected: usize,
        /// Number of instances in the offending group
        found: usize,
    },

    /// A library instance referenced by a module is not part of the registry.
    #[error("Library instance {0} is not registered in the workspace")]
    LibraryInstanceNotFound(String),

    /// A module requested by name or GUID is not part of the registry.
    #[error("Module {0} is not registered in the workspace")]
    ModuleNotFound(String),

    /// A dependent package is not part of the registry.
    #[error("Package {0} is not registered in the workspace")]
    PackageNotFound(String),

    /// No registered package declares a header for this library class.
    #[error("Can not find library class [{0}] declaration in any package")]
    LibraryClassNotFound(String),

    /// A capability keyword has no declaration in any dependent package.
    #[error("Can not find {kind} GUID [{keyword}] declaration in any dependent package")]
    DeclarationNotFound {
        /// Set the keyword was aggregated into
        kind: CapabilityKind,
        /// The unresolved keyword
        keyword: String,
    },

    /// The legacy flash-map header could not be found at the given location.
    #[error("Legacy flash map header {} does not exist", .0.display())]
    FlashMapMissing(PathBuf),

    /// An existing output file could not be read for comparison.
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An output file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The workspace document is structurally invalid.
    ///
    /// The error includes details about what was malformed and where in the loader the error
    /// was detected.
    #[error("Malformed workspace - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// XML syntax errors from the workspace reader.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// A GUID string is not in registry format.
    #[error("Invalid GUID - {0}")]
    InvalidGuid(String),

    /// A module type spelling is not recognised.
    #[error("Unknown module type - {0}")]
    ModuleTypeUnknown(String),

    /// An architecture spelling is not recognised.
    #[error("Unknown architecture - {0}")]
    ArchUnknown(String),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorCategory {
    /// Inconsistent module, library or package declarations
    Configuration,
    /// A capability keyword could not be mapped to a GUID
    Resolution,
    /// Filesystem access failed
    Io,
    /// The workspace document could not be loaded
    Workspace,
}

impl Error {
    /// Returns the class this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::CyclicDependency(_)
            | Error::EntryPointCount { .. }
            | Error::DriverModelMismatch { .. }
            | Error::LibraryInstanceNotFound(_)
            | Error::ModuleNotFound(_)
            | Error::PackageNotFound(_)
            | Error::LibraryClassNotFound(_) => ErrorCategory::Configuration,
            Error::DeclarationNotFound { .. } => ErrorCategory::Resolution,
            Error::FlashMapMissing(_)
            | Error::ReadFailed { .. }
            | Error::WriteFailed { .. }
            | Error::FileError(_) => ErrorCategory::Io,
            Error::Malformed { .. }
            | Error::Xml(_)
            | Error::InvalidGuid(_)
            | Error::ModuleTypeUnknown(_)
            | Error::ArchUnknown(_) => ErrorCategory::Workspace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = Error::CyclicDependency(vec!["A".into(), "B".into(), "A".into()]);
        assert_eq!(
            err.to_string(),
            "Cyclic library instance dependency: A -> B -> A"
        );
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_declaration_not_found_names_keyword_and_set() {
        let err = Error::DeclarationNotFound {
            kind: CapabilityKind::Protocol,
            keyword: "Foo".into(),
        };
        let message = err.to_string();
        assert!(message.contains("Protocol"));
        assert!(message.contains("[Foo]"));
        assert_eq!(err.category(), ErrorCategory::Resolution);
    }

    #[test]
    fn test_malformed_macro_records_location() {
        let err = malformed_error!("missing attribute {}", "Guid");
        match &err {
            Error::Malformed { message, file, .. } => {
                assert_eq!(message, "missing attribute Guid");
                assert!(file.ends_with("error.rs"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(err.category(), ErrorCategory::Workspace);
    }
}
