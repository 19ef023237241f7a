//! Content-compared output writes.
//!
//! Build systems key rebuilds off modification times, so a generated file is only rewritten
//! when its bytes actually change. New content goes through a temporary file in the target
//! directory that is renamed into place.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::debug;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// What [`write_if_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOutcome {
    /// The file was created or its content replaced
    Written,
    /// The file already held exactly this content and was left untouched
    Unchanged,
}

/// Writes `contents` to `path` unless the file already holds exactly those bytes.
///
/// # Errors
/// Returns [`Error::ReadFailed`] if an existing file cannot be read and [`Error::WriteFailed`]
/// if the new content cannot be written.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> Result<WriteOutcome> {
    match fs::read(path) {
        Ok(existing) if existing == contents => {
            debug!("{} is up to date", path.display());
            return Ok(WriteOutcome::Unchanged);
        }
        Ok(_) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(Error::ReadFailed {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    persist(path, contents).map_err(|source| Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(WriteOutcome::Written)
}

fn persist(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Copies `source` to `destination` if the destination is missing or older than the source.
///
/// # Errors
/// Returns [`Error::FlashMapMissing`] if `source` does not exist, and
/// [`Error::ReadFailed`] / [`Error::WriteFailed`] for I/O failures.
pub fn copy_if_newer(source: &Path, destination: &Path) -> Result<WriteOutcome> {
    let source_modified = match fs::metadata(source) {
        Ok(metadata) => metadata.modified(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(Error::FlashMapMissing(source.to_path_buf()))
        }
        Err(source_error) => {
            return Err(Error::ReadFailed {
                path: source.to_path_buf(),
                source: source_error,
            })
        }
    }
    .map_err(|error| Error::ReadFailed {
        path: source.to_path_buf(),
        source: error,
    })?;

    let stale = match fs::metadata(destination).and_then(|metadata| metadata.modified()) {
        Ok(destination_modified) => destination_modified < source_modified,
        Err(_) => true,
    };
    if !stale {
        return Ok(WriteOutcome::Unchanged);
    }

    let contents = fs::read(source).map_err(|error| Error::ReadFailed {
        path: source.to_path_buf(),
        source: error,
    })?;
    persist(destination, &contents).map_err(|error| Error::WriteFailed {
        path: destination.to_path_buf(),
        source: error,
    })?;
    debug!("copied {} to {}", source.display(), destination.display());
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AutoGen.h");

        assert_eq!(write_if_changed(&path, b"one").unwrap(), WriteOutcome::Written);
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        assert_eq!(write_if_changed(&path, b"one").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);

        assert_eq!(write_if_changed(&path, b"two").unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read(&path).unwrap(), b"two");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("AutoGen.c");
        assert!(matches!(
            write_if_changed(&path, b"x"),
            Err(Error::WriteFailed { .. })
        ));
    }

    #[test]
    fn test_copy_if_newer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("FlashMap.h");
        let destination = dir.path().join("TianoR8FlashMap.h");

        assert!(matches!(
            copy_if_newer(&source, &destination),
            Err(Error::FlashMapMissing(path)) if path == source
        ));

        fs::write(&source, "#define FLASH_BASE 0xFFF00000\n").unwrap();
        assert_eq!(copy_if_newer(&source, &destination).unwrap(), WriteOutcome::Written);
        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "#define FLASH_BASE 0xFFF00000\n"
        );
        assert_eq!(copy_if_newer(&source, &destination).unwrap(), WriteOutcome::Unchanged);
    }
}
