use crate::error::StorageError;
use crate::key::StorageKey;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maps a key to its file under `root`, refusing anything that would land outside it.
///
/// `root` must already be canonical. A file that exists as a symlink is followed and its
/// target must still live inside the root.
pub(crate) fn resolve_key(
    root: &Path,
    key: &StorageKey,
    extension: Option<&str>,
) -> Result<PathBuf, StorageError> {
    let file_name = match extension {
        Some(ext) => format!("{key}.{ext}"),
        None => key.to_string(),
    };
    let candidate = root.join(file_name);

    if candidate.parent() != Some(root) {
        return Err(StorageError::SandboxViolation {
            message: candidate.display().to_string().into(),
            context: Some("Key resolved outside the storage root".into()),
        });
    }

    match candidate.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => check_link_target(root, &candidate)?,
        Ok(_) => {},
        Err(err) if err.kind() == ErrorKind::NotFound => {},
        Err(err) => {
            return Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to inspect {}", candidate.display()).into()),
            });
        },
    }

    Ok(candidate)
}

fn check_link_target(root: &Path, link: &Path) -> Result<(), StorageError> {
    match link.canonicalize() {
        Ok(target) if target.starts_with(root) => Ok(()),
        Ok(target) => Err(StorageError::SandboxViolation {
            message: target.display().to_string().into(),
            context: Some("Symlink points outside the storage root".into()),
        }),
        // Dangling link: writing would create the target wherever it points.
        Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::SandboxViolation {
            message: link.display().to_string().into(),
            context: Some("Dangling symlink inside the storage root".into()),
        }),
        Err(err) => Err(StorageError::Io {
            source: err,
            context: Some(format!("Failed to resolve symlink {}", link.display()).into()),
        }),
    }
}

/// Checks a file extension supplied through the builder.
pub(crate) fn validate_extension(ext: &str) -> Result<(), StorageError> {
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StorageError::InvalidKey {
            message: ext.to_owned().into(),
            context: Some("File extension must be non-empty ASCII alphanumerics".into()),
        });
    }
    Ok(())
}
