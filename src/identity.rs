//! Project identity and storage layout resolution.
//!
//! A project is identified by its root directory's base name, optionally
//! suffixed with a subproject id. The derived namespace selects the slot
//! under `~/.mcp-docs/` that holds the project's documents.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Directory under the user home that holds all per-project document stores.
pub const CACHE_DIR_NAME: &str = ".mcp-docs";

/// Name of the symlink placed in the project root.
pub const LINK_NAME: &str = ".neurolora";

/// A project root plus an optional subproject discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    root: PathBuf,
    subproject: Option<String>,
}

impl ProjectIdentity {
    pub fn new(root: impl Into<PathBuf>, subproject: Option<&str>) -> Self {
        Self {
            root: root.into(),
            subproject: subproject.map(str::to_owned),
        }
    }

    /// Storage namespace for this project: the root directory's base name,
    /// suffixed with `-{subproject}` when one is set. Deterministic for the
    /// same inputs.
    pub fn namespace(&self) -> String {
        let base = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());

        match &self.subproject {
            Some(sub) => format!("{base}-{sub}"),
            None => base,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subproject(&self) -> Option<&str> {
        self.subproject.as_deref()
    }
}

/// The canonical on-disk locations for one project.
///
/// `docs_dir` is the authoritative store; `link_path` is an access alias in
/// the project root and owns no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub cache_root: PathBuf,
    pub docs_dir: PathBuf,
    pub link_path: PathBuf,
}

impl StorageLayout {
    /// Resolve the layout against the real user home directory.
    ///
    /// The only failure mode is an undeterminable home directory, which is
    /// fatal for the whole component.
    pub fn resolve(identity: &ProjectIdentity) -> Result<Self, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::HomeDirUnavailable)?;
        Ok(Self::resolve_in(&home, identity))
    }

    /// Resolve against an explicit home directory.
    ///
    /// Pure path arithmetic, no filesystem access. This is the seam used by
    /// tests and embedders that must not depend on `$HOME`.
    pub fn resolve_in(home: &Path, identity: &ProjectIdentity) -> Self {
        let cache_root = home.join(CACHE_DIR_NAME);
        let docs_dir = cache_root.join(identity.namespace());
        let link_path = identity.root().join(LINK_NAME);

        Self {
            cache_root,
            docs_dir,
            link_path,
        }
    }
}
