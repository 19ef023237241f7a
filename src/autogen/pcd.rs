use std::path::Path;

use crate::{Error, Result};

/// Text the PCD subsystem contributes to a module's generated files.
///
/// Both fragments are appended verbatim: `header` just before the closing `#endif` of
/// `AutoGen.h`, `source` at the very end of `AutoGen.c`. Fragments are expected to end with a
/// newline when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcdFragments {
    /// Fragment for `AutoGen.h`
    pub header: String,
    /// Fragment for `AutoGen.c`
    pub source: String,
}

impl PcdFragments {
    /// Creates fragments from already rendered text.
    pub fn new(header: impl Into<String>, source: impl Into<String>) -> Self {
        PcdFragments {
            header: header.into(),
            source: source.into(),
        }
    }

    /// Reads fragments from files; a missing path means an empty fragment.
    ///
    /// # Errors
    /// Returns [`Error::ReadFailed`] if a given file cannot be read.
    pub fn from_files(header: Option<&Path>, source: Option<&Path>) -> Result<Self> {
        Ok(PcdFragments {
            header: read_fragment(header)?,
            source: read_fragment(source)?,
        })
    }
}

fn read_fragment(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    std::fs::read_to_string(path).map_err(|source| Error::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}
