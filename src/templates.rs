//! Bundled templates and one-time seeding.
//!
//! Seed files are created from templates only when the destination is
//! absent; an existing destination is never touched again. The default
//! store serves templates compiled into the binary; a directory-backed
//! store exists for callers that ship templates on disk.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::TemplateError;

const IGNORE_TEMPLATE: &str = include_str!("../templates/ignore.template");
const TODO_TEMPLATE: &str = include_str!("../templates/todo.template.md");
const DONE_TEMPLATE: &str = include_str!("../templates/done.template.md");

/// One template-to-destination mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub template_name: String,
    pub destination_name: String,
    pub destination_dir: PathBuf,
}

impl TemplateSpec {
    pub fn new(
        template_name: &str,
        destination_name: &str,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            template_name: template_name.to_string(),
            destination_name: destination_name.to_string(),
            destination_dir: destination_dir.into(),
        }
    }

    /// Full destination path for this seed.
    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.destination_name)
    }
}

/// Terminal state of one seeding pass. No outcome transitions back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Destination was created from the template.
    Seeded,
    /// Destination already existed and was left untouched.
    AlreadyPresent,
    /// The named template is not in the store; destination not created.
    TemplateMissing,
}

/// Lookup of template content by fixed name.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Store backed by the templates compiled into the binary.
    pub fn bundled() -> Self {
        Self { dir: None }
    }

    /// Store backed by a directory of template files.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Look up a template by name. `Ok(None)` means the template is absent,
    /// which callers treat as a skip, not a failure.
    pub fn lookup(&self, name: &str) -> Result<Option<String>, TemplateError> {
        let Some(dir) = &self.dir else {
            return Ok(bundled_template(name).map(str::to_owned));
        };

        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(template_error(path, err)),
        }
    }

    /// Copy the named template verbatim to the spec's destination, unless
    /// the destination already exists. Never overwrites.
    pub fn seed_if_absent(&self, spec: &TemplateSpec) -> Result<SeedOutcome, TemplateError> {
        let destination = spec.destination();
        if destination.exists() {
            debug!("{} already present, leaving untouched", destination.display());
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let Some(content) = self.lookup(&spec.template_name)? else {
            warn!(
                "Template file not found: {}; skipping {}",
                spec.template_name,
                destination.display()
            );
            return Ok(SeedOutcome::TemplateMissing);
        };

        fs::write(&destination, content).map_err(|err| template_error(destination.clone(), err))?;
        debug!(
            "seeded {} from template {}",
            destination.display(),
            spec.template_name
        );
        Ok(SeedOutcome::Seeded)
    }
}

fn bundled_template(name: &str) -> Option<&'static str> {
    match name {
        "ignore.template" => Some(IGNORE_TEMPLATE),
        "todo.template.md" => Some(TODO_TEMPLATE),
        "done.template.md" => Some(DONE_TEMPLATE),
        _ => None,
    }
}

fn template_error(path: PathBuf, source: io::Error) -> TemplateError {
    match source.kind() {
        io::ErrorKind::PermissionDenied => TemplateError::PermissionDenied { path },
        io::ErrorKind::InvalidData => TemplateError::InvalidEncoding { path },
        _ => TemplateError::Io { path, source },
    }
}
