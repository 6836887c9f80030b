//! Durable per-project storage layout for the Neurolora MCP server.
//!
//! Reconciles three pieces of filesystem state on every `setup()`: the
//! documents directory under `~/.mcp-docs/`, the `.neurolora` symlink in the
//! project root, and one-time seed files created from bundled templates.

pub mod error;
pub mod identity;
pub mod init;
pub mod poll;
pub mod store;
pub mod symlink;
pub mod templates;

pub use error::{DirectoryError, StorageError, SymlinkError, TemplateError};
pub use identity::{ProjectIdentity, StorageLayout};
pub use poll::PollPolicy;
pub use store::StoreManager;
pub use symlink::SymlinkState;
pub use templates::{SeedOutcome, TemplateSpec, TemplateStore};
