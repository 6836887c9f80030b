//! Tests that exercise real home-directory resolution via `$HOME`.
//!
//! These mutate process-wide environment state, so they are serialized.

use std::env;
use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use neurolora_store::{ProjectIdentity, StorageLayout, StoreManager};

struct HomeGuard {
    previous: Option<String>,
}

impl HomeGuard {
    fn set(home: &std::path::Path) -> Self {
        let previous = env::var("HOME").ok();
        env::set_var("HOME", home);
        Self { previous }
    }
}

impl Drop for HomeGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }
    }
}

#[test]
#[serial]
fn test_manager_resolves_against_home_env() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let root = temp.path().join("app");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&root).unwrap();
    let _guard = HomeGuard::set(&home);

    let manager = StoreManager::new(&root, None).unwrap();
    manager.setup().unwrap();

    assert!(home.join(".mcp-docs").join("app").is_dir());
    assert_eq!(manager.docs_dir(), home.join(".mcp-docs").join("app"));
}

#[test]
#[serial]
fn test_layout_resolve_uses_home_env() {
    let temp = TempDir::new().unwrap();
    let _guard = HomeGuard::set(temp.path());

    let identity = ProjectIdentity::new("/srv/demo", Some("api"));
    let layout = StorageLayout::resolve(&identity).unwrap();

    assert_eq!(layout.cache_root, temp.path().join(".mcp-docs"));
    assert_eq!(layout.docs_dir, temp.path().join(".mcp-docs").join("demo-api"));
}

#[test]
#[serial]
fn test_manager_from_current_dir() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let root = temp.path().join("workdir");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&root).unwrap();
    let _guard = HomeGuard::set(&home);

    let previous = env::current_dir().unwrap();
    env::set_current_dir(&root).unwrap();
    let manager = StoreManager::from_current_dir(None);
    env::set_current_dir(previous).unwrap();

    let manager = manager.unwrap();
    assert_eq!(manager.identity().namespace(), "workdir");
}
