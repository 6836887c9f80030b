//! Storage manager: the setup pipeline and output path resolution.
//!
//! `setup()` runs identity resolution, durable directory creation, symlink
//! reconciliation, and template seeding in that fixed order; each step's
//! postcondition is the next step's precondition. Safe to re-run: existing
//! correct state is left untouched.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DirectoryError, StorageError};
use crate::identity::{ProjectIdentity, StorageLayout};
use crate::init;
use crate::poll::PollPolicy;
use crate::symlink;
use crate::templates::{TemplateSpec, TemplateStore};

/// Name of the ignore file seeded into the project root.
pub const IGNORE_FILE_NAME: &str = ".neuroloraignore";

/// Manages the durable documents directory and project-root symlink for one
/// project.
///
/// No cross-process locking is applied: two instances reconciling the same
/// project race on the filesystem's own mkdir/symlink atomicity, and the
/// result ordering is unspecified. Both converge to the same layout.
#[derive(Debug, Clone)]
pub struct StoreManager {
    identity: ProjectIdentity,
    layout: StorageLayout,
    policy: PollPolicy,
    templates: TemplateStore,
}

impl StoreManager {
    /// Manager for `root`, with storage resolved under the user's home
    /// directory.
    pub fn new(root: impl Into<PathBuf>, subproject: Option<&str>) -> Result<Self, StorageError> {
        let home = dirs::home_dir().ok_or(StorageError::HomeDirUnavailable)?;
        Ok(Self::open_in(&home, root, subproject))
    }

    /// Manager rooted at the current working directory.
    pub fn from_current_dir(subproject: Option<&str>) -> Result<Self, StorageError> {
        let cwd = env::current_dir().map_err(StorageError::CurrentDirUnavailable)?;
        Self::new(cwd, subproject)
    }

    /// Manager with an explicit home directory. Pure construction, no
    /// filesystem access until `setup`.
    pub fn open_in(home: &Path, root: impl Into<PathBuf>, subproject: Option<&str>) -> Self {
        let identity = ProjectIdentity::new(absolute_root(root.into()), subproject);
        let layout = StorageLayout::resolve_in(home, &identity);
        debug!(
            "storage layout for {}: docs dir {}, link {}",
            identity.namespace(),
            layout.docs_dir.display(),
            layout.link_path.display()
        );

        Self {
            identity,
            layout,
            policy: PollPolicy::default(),
            templates: TemplateStore::bundled(),
        }
    }

    /// Override the visibility poll budget.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the template store.
    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = templates;
        self
    }

    /// Establish the full storage layout: cache root, durable documents
    /// directory, project-root symlink, and seed files.
    ///
    /// Aborts on the first directory or symlink error; a template I/O error
    /// aborts the remaining seeds. Re-running on a correct layout changes
    /// nothing.
    pub fn setup(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.layout.cache_root).map_err(|source| DirectoryError::Create {
            path: self.layout.cache_root.clone(),
            source,
        })?;

        init::ensure_durable(&self.layout.docs_dir, &self.policy)?;
        symlink::reconcile(&self.layout.link_path, &self.layout.docs_dir, &self.policy)?;

        for spec in self.template_specs() {
            self.templates.seed_if_absent(&spec)?;
        }

        info!(
            "Storage setup complete. Project directory: {}",
            self.layout.docs_dir.display()
        );
        Ok(())
    }

    /// Path for a generated artifact inside the documents directory.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.layout.docs_dir.join(filename)
    }

    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn docs_dir(&self) -> &Path {
        &self.layout.docs_dir
    }

    pub fn link_path(&self) -> &Path {
        &self.layout.link_path
    }

    /// The three fixed seeds: the ignore file in the project root, the task
    /// files in the documents directory.
    fn template_specs(&self) -> [TemplateSpec; 3] {
        [
            TemplateSpec::new("ignore.template", IGNORE_FILE_NAME, self.identity.root()),
            TemplateSpec::new("todo.template.md", "TODO.md", &self.layout.docs_dir),
            TemplateSpec::new("done.template.md", "DONE.md", &self.layout.docs_dir),
        ]
    }
}

/// Anchor a relative project root to the working directory so the symlink
/// arithmetic always runs on absolute paths.
fn absolute_root(root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        root
    } else {
        env::current_dir().map(|cwd| cwd.join(&root)).unwrap_or(root)
    }
}
