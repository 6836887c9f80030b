//! Documents directory initialization with a durability barrier.
//!
//! Creating the directory is not enough on filesystems with asynchronous
//! metadata visibility. The sequence here is: create, write and fsync a
//! marker file, sync the filesystem, then confirm existence twice, once
//! immediately and once under a bounded poll.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::DirectoryError;
use crate::poll::PollPolicy;

/// Name of the sentinel file written to force a flush of the new directory.
pub const MARKER_NAME: &str = ".initialized";

const MARKER_CONTENT: &str = "initialized";

/// Create `docs_dir` and block until it is durably visible.
///
/// After this returns `Ok`, any subsequent process on the same host will
/// observe the directory.
pub fn ensure_durable(docs_dir: &Path, policy: &PollPolicy) -> Result<(), DirectoryError> {
    ensure_durable_with(docs_dir, policy, |path| path.exists(), thread::sleep)
}

/// `ensure_durable` with an injectable poll probe and sleep, so the retry
/// budget can be exercised against a simulated backend without real delay.
pub fn ensure_durable_with<P, S>(
    docs_dir: &Path,
    policy: &PollPolicy,
    mut probe: P,
    sleep: S,
) -> Result<(), DirectoryError>
where
    P: FnMut(&Path) -> bool,
    S: FnMut(Duration),
{
    fs::create_dir_all(docs_dir).map_err(|source| DirectoryError::Create {
        path: docs_dir.to_path_buf(),
        source,
    })?;
    debug!("created or verified docs directory: {}", docs_dir.display());

    write_marker(docs_dir)?;
    nix::unistd::sync();

    if !docs_dir.exists() {
        return Err(DirectoryError::NotCreated {
            path: docs_dir.to_path_buf(),
        });
    }

    if !policy.wait_with(|| probe(docs_dir), sleep) {
        return Err(DirectoryError::NotVisible {
            path: docs_dir.to_path_buf(),
            attempts: policy.attempts,
        });
    }

    nix::unistd::sync();
    debug!("docs directory durably visible: {}", docs_dir.display());
    Ok(())
}

/// Write and fsync the `.initialized` marker inside `docs_dir`.
fn write_marker(docs_dir: &Path) -> Result<(), DirectoryError> {
    let path = docs_dir.join(MARKER_NAME);
    let marker_err = |source| DirectoryError::Marker {
        path: path.clone(),
        source,
    };

    let mut file = File::create(&path).map_err(marker_err)?;
    file.write_all(MARKER_CONTENT.as_bytes()).map_err(marker_err)?;
    file.sync_all().map_err(marker_err)?;
    Ok(())
}
