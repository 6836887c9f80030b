//! Error taxonomy for storage setup.
//!
//! Directory and symlink failures abort the whole pipeline; a template error
//! is fatal for the file being seeded. A missing bundled template is an
//! outcome, not an error (`SeedOutcome::TemplateMissing`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to create the documents directory or to observe it on disk.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write marker file {}: {source}", .path.display())]
    Marker {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The directory vanished between creation and the first existence check.
    #[error("Directory missing immediately after creation: {}", .path.display())]
    NotCreated { path: PathBuf },

    /// The visibility poll exhausted its budget without observing the path.
    #[error("Directory not visible after {attempts} checks: {}", .path.display())]
    NotVisible { path: PathBuf, attempts: u32 },
}

/// Failure to bring the project-root symlink to its target state.
#[derive(Debug, Error)]
pub enum SymlinkError {
    #[error("Failed to inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create link target {}: {source}", .path.display())]
    Target {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove existing entry {}: {source}", .path.display())]
    RemoveExisting {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create symlink {} -> {}: {source}", .link.display(), .target.display())]
    Create {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Symlink was not created: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Path exists but is not a symlink: {}", .path.display())]
    NotASymlink { path: PathBuf },

    #[error(
        "Symlink {} resolves to {}, expected {}",
        .link.display(),
        .actual.display(),
        .expected.display()
    )]
    TargetMismatch {
        link: PathBuf,
        expected: PathBuf,
        actual: PathBuf,
    },

    #[error("Symlink not visible after {attempts} checks: {}", .path.display())]
    NotVisible { path: PathBuf, attempts: u32 },
}

/// Failure while seeding one destination file from a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Permission denied accessing {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Invalid text encoding in {}", .path.display())]
    InvalidEncoding { path: PathBuf },

    #[error("I/O error with {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Top-level error surfaced by `StoreManager`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to determine home directory")]
    HomeDirUnavailable,

    #[error("Failed to determine working directory: {0}")]
    CurrentDirUnavailable(#[source] io::Error),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Symlink(#[from] SymlinkError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
