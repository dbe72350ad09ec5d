//! # mediahub-remote
//!
//! Executes folder operations on the media servers that host folder
//! directories. The servers share no filesystem or transaction with the
//! catalog; every side effect travels as a shell command over an
//! out-of-band channel.
//!
//! [`RemoteFolderExecutor`] is the contract consumed by the lifecycle
//! manager. Implementations:
//!
//! - [`SshFolderExecutor`]: the system `ssh` client, one process per command.
//! - [`LocalFolderExecutor`]: `sh -c` on this host, for single-host setups.
//! - [`MemoryFolderExecutor`]: in-memory directories with failure injection.

pub mod command;
pub mod error;
pub mod executor;
pub mod local;
pub mod memory;
pub mod paths;
pub mod retry;
pub mod ssh;

use std::sync::Arc;

use mediahub_core::config::{RemoteConfig, RemoteTransport};

pub use command::{CommandKind, RemoteCommand};
pub use error::RemoteError;
pub use executor::{CommandOutput, RemoteFolderExecutor};
pub use local::LocalFolderExecutor;
pub use memory::MemoryFolderExecutor;
pub use paths::RemotePaths;
pub use retry::RetryPolicy;
pub use ssh::SshFolderExecutor;

/// Build the executor selected by `remote.transport`.
pub fn executor_from_config(config: &RemoteConfig) -> Arc<dyn RemoteFolderExecutor> {
    match config.transport {
        RemoteTransport::Ssh => Arc::new(SshFolderExecutor::new(config)),
        RemoteTransport::Local => Arc::new(LocalFolderExecutor::new(config)),
    }
}
