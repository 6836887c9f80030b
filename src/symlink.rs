//! Project-root symlink reconciliation.
//!
//! The `.neurolora` entry in the project root must exist, be a symlink, and
//! resolve to the documents directory. Whatever is found there (nothing, a
//! plain file or directory, or a link to the wrong place) is corrected, and
//! the result is verified and polled for visibility before success.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Component, Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SymlinkError;
use crate::poll::PollPolicy;

/// Observed state of the entry at a link path. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkState {
    pub exists: bool,
    pub is_symlink: bool,
    pub resolved_target: Option<PathBuf>,
}

impl SymlinkState {
    /// Observe the entry at `link` without modifying it.
    pub fn observe(link: &Path) -> Self {
        let Ok(meta) = fs::symlink_metadata(link) else {
            return Self {
                exists: false,
                is_symlink: false,
                resolved_target: None,
            };
        };

        Self {
            exists: true,
            is_symlink: meta.file_type().is_symlink(),
            resolved_target: fs::canonicalize(link).ok(),
        }
    }
}

/// Bring `link` to its target state: an existing relative symlink resolving
/// to `target`. A correct link is left untouched.
pub fn reconcile(link: &Path, target: &Path, policy: &PollPolicy) -> Result<(), SymlinkError> {
    reconcile_with(
        link,
        target,
        policy,
        |path| {
            let state = SymlinkState::observe(path);
            state.exists && state.is_symlink
        },
        thread::sleep,
    )
}

/// `reconcile` with an injectable poll probe and sleep.
pub fn reconcile_with<P, S>(
    link: &Path,
    target: &Path,
    policy: &PollPolicy,
    mut probe: P,
    sleep: S,
) -> Result<(), SymlinkError>
where
    P: FnMut(&Path) -> bool,
    S: FnMut(Duration),
{
    // The link cannot resolve unless the target directory exists.
    fs::create_dir_all(target).map_err(|source| SymlinkError::Target {
        path: target.to_path_buf(),
        source,
    })?;

    match fs::symlink_metadata(link) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            create_link(link, target)?;
        }
        Err(source) => {
            return Err(SymlinkError::Inspect {
                path: link.to_path_buf(),
                source,
            });
        }
        Ok(meta) if !meta.file_type().is_symlink() => {
            warn!("replacing non-symlink entry at {}", link.display());
            remove_entry(link, meta.is_dir())?;
            create_link(link, target)?;
        }
        Ok(_) => {
            let expected = canonical_target(target)?;
            if fs::canonicalize(link).ok().as_deref() != Some(expected.as_path()) {
                warn!(
                    "redirecting {} to {}",
                    link.display(),
                    target.display()
                );
                remove_entry(link, false)?;
                create_link(link, target)?;
            }
        }
    }

    verify(link, target)?;
    nix::unistd::sync();

    if !policy.wait_with(|| probe(link), sleep) {
        return Err(SymlinkError::NotVisible {
            path: link.to_path_buf(),
            attempts: policy.attempts,
        });
    }

    nix::unistd::sync();
    debug!("symlink verified: {} -> {}", link.display(), target.display());
    Ok(())
}

/// Confirm the post-condition: `link` exists, is a symlink, and resolves to
/// exactly `target`.
fn verify(link: &Path, target: &Path) -> Result<(), SymlinkError> {
    let state = SymlinkState::observe(link);
    if !state.exists {
        return Err(SymlinkError::Missing {
            path: link.to_path_buf(),
        });
    }
    if !state.is_symlink {
        return Err(SymlinkError::NotASymlink {
            path: link.to_path_buf(),
        });
    }

    let expected = canonical_target(target)?;
    match state.resolved_target {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(SymlinkError::TargetMismatch {
            link: link.to_path_buf(),
            expected,
            actual: actual.unwrap_or_else(|| PathBuf::from("<unresolved>")),
        }),
    }
}

fn canonical_target(target: &Path) -> Result<PathBuf, SymlinkError> {
    fs::canonicalize(target).map_err(|source| SymlinkError::Inspect {
        path: target.to_path_buf(),
        source,
    })
}

fn create_link(link: &Path, target: &Path) -> Result<(), SymlinkError> {
    let parent = link.parent().unwrap_or_else(|| Path::new("/"));
    let relative = relative_target(target, parent);

    symlink(&relative, link).map_err(|source| SymlinkError::Create {
        link: link.to_path_buf(),
        target: relative.clone(),
        source,
    })?;

    debug!("created symlink {} -> {}", link.display(), relative.display());
    Ok(())
}

fn remove_entry(link: &Path, is_dir: bool) -> Result<(), SymlinkError> {
    let removed = if is_dir {
        fs::remove_dir_all(link)
    } else {
        fs::remove_file(link)
    };

    removed.map_err(|source| SymlinkError::RemoveExisting {
        path: link.to_path_buf(),
        source,
    })
}

/// Compute `target` relative to `base`: strip the shared prefix, back out of
/// what remains of `base` with `..`, then descend into the rest of `target`.
///
/// Keeping the link relative makes the project tree portable across
/// relocation, as long as the cache root moves with it by the same offset.
fn relative_target(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();

    let shared = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[shared..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_target_sibling_trees() {
        let relative = relative_target(
            Path::new("/tmp/home/.mcp-docs/app"),
            Path::new("/tmp/app"),
        );
        assert_eq!(relative, PathBuf::from("../home/.mcp-docs/app"));
    }

    #[test]
    fn test_relative_target_descendant() {
        let relative = relative_target(Path::new("/tmp/app/docs"), Path::new("/tmp/app"));
        assert_eq!(relative, PathBuf::from("docs"));
    }

    #[test]
    fn test_relative_target_same_path() {
        let relative = relative_target(Path::new("/tmp/app"), Path::new("/tmp/app"));
        assert_eq!(relative, PathBuf::from("."));
    }

    #[test]
    fn test_observe_missing_entry() {
        let temp = TempDir::new().unwrap();
        let state = SymlinkState::observe(&temp.path().join("absent"));

        assert!(!state.exists);
        assert!(!state.is_symlink);
        assert_eq!(state.resolved_target, None);
    }

    #[test]
    fn test_observe_plain_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("plain");
        fs::create_dir(&dir).unwrap();

        let state = SymlinkState::observe(&dir);
        assert!(state.exists);
        assert!(!state.is_symlink);
    }

    #[test]
    fn test_reconcile_creates_relative_link() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        fs::create_dir_all(&root).unwrap();

        let link = root.join(".neurolora");
        reconcile(&link, &target, &PollPolicy::default()).unwrap();

        let state = SymlinkState::observe(&link);
        assert!(state.exists);
        assert!(state.is_symlink);
        assert_eq!(
            state.resolved_target.unwrap(),
            fs::canonicalize(&target).unwrap()
        );

        let raw = fs::read_link(&link).unwrap();
        assert!(raw.is_relative(), "link target should be relative: {raw:?}");
    }

    #[test]
    fn test_reconcile_is_noop_when_correct() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        fs::create_dir_all(&root).unwrap();

        let link = root.join(".neurolora");
        reconcile(&link, &target, &PollPolicy::default()).unwrap();
        let first = fs::read_link(&link).unwrap();

        reconcile(&link, &target, &PollPolicy::default()).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), first);
    }

    #[test]
    fn test_reconcile_replaces_plain_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        fs::create_dir_all(&root).unwrap();

        let link = root.join(".neurolora");
        fs::create_dir(&link).unwrap();
        fs::write(link.join("stale.txt"), "stale").unwrap();

        reconcile(&link, &target, &PollPolicy::default()).unwrap();

        let state = SymlinkState::observe(&link);
        assert!(state.is_symlink);
        assert_eq!(
            state.resolved_target.unwrap(),
            fs::canonicalize(&target).unwrap()
        );
    }

    #[test]
    fn test_reconcile_redirects_wrong_target() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        let unrelated = temp.path().join("elsewhere");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&unrelated).unwrap();

        let link = root.join(".neurolora");
        symlink(&unrelated, &link).unwrap();

        reconcile(&link, &target, &PollPolicy::default()).unwrap();

        assert_eq!(
            SymlinkState::observe(&link).resolved_target.unwrap(),
            fs::canonicalize(&target).unwrap()
        );
    }

    #[test]
    fn test_reconcile_replaces_plain_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        fs::create_dir_all(&root).unwrap();

        let link = root.join(".neurolora");
        fs::write(&link, "not a link").unwrap();

        reconcile(&link, &target, &PollPolicy::default()).unwrap();
        assert!(SymlinkState::observe(&link).is_symlink);
    }

    #[test]
    fn test_visibility_poll_exhaustion() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        let target = temp.path().join("store").join("project");
        fs::create_dir_all(&root).unwrap();

        let link = root.join(".neurolora");
        let mut probes = 0;
        let result = reconcile_with(
            &link,
            &target,
            &PollPolicy::default(),
            |_| {
                probes += 1;
                false
            },
            |_| {},
        );

        match result {
            Err(SymlinkError::NotVisible { attempts, .. }) => assert_eq!(attempts, 10),
            other => panic!("expected NotVisible, got {other:?}"),
        }
        assert_eq!(probes, 10);
    }
}
