//! The remote folder execution contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mediahub_core::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::ServerId;

use crate::command::RemoteCommand;
use crate::paths::RemotePaths;

/// Captured result of a remote command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
    /// Exit status (0 on success).
    pub exit_code: i32,
}

/// Executes folder operations against a named media server.
///
/// Every method is a blocking round trip from the caller's point of view
/// and fails with an error of kind `RemoteExecution` on connection,
/// authorization, timeout, or non-zero exit. Implementations bound each
/// round trip with a timeout and retry transient failures of idempotent
/// commands.
#[async_trait]
pub trait RemoteFolderExecutor: Send + Sync + std::fmt::Debug + 'static {
    /// Short transport name for logging (`"ssh"`, `"local"`, `"memory"`).
    fn transport(&self) -> &str;

    /// Path builder for the content root of the media servers.
    fn paths(&self) -> &RemotePaths;

    /// Run a command on `server`.
    async fn run_command(
        &self,
        server: ServerId,
        command: &RemoteCommand,
    ) -> AppResult<CommandOutput>;

    /// Make sure `<root>/<login>` exists. Idempotent.
    async fn ensure_base_directory(&self, server: ServerId, login: &str) -> AppResult<()> {
        let path = self.paths().base_dir(login)?;
        self.run_command(server, &RemoteCommand::MakeDir { path })
            .await
            .map(|_| ())
    }

    /// Make sure `<root>/<login>/<name>` exists. Idempotent.
    async fn create_folder(&self, server: ServerId, login: &str, name: &str) -> AppResult<()> {
        let path = self.paths().folder_dir(login, name)?;
        self.run_command(server, &RemoteCommand::MakeDir { path })
            .await
            .map(|_| ())
    }

    /// Whether a directory exists at `path`.
    async fn directory_exists(&self, server: ServerId, path: &str) -> AppResult<bool> {
        let output = self
            .run_command(
                server,
                &RemoteCommand::Probe {
                    path: path.to_string(),
                },
            )
            .await?;

        RemoteCommand::parse_probe(&output.stdout).ok_or_else(|| {
            AppError::remote_execution(format!(
                "Unexpected probe output from server {server}: {:?}",
                output.stdout.trim()
            ))
        })
    }

    /// Remove the directory tree at `path`. A missing directory is success.
    async fn remove_directory(&self, server: ServerId, path: &str) -> AppResult<()> {
        self.run_command(
            server,
            &RemoteCommand::RemoveDir {
                path: path.to_string(),
            },
        )
        .await
        .map(|_| ())
    }

    /// Rename the directory at `from` to `to`. Not retried.
    async fn move_directory(&self, server: ServerId, from: &str, to: &str) -> AppResult<()> {
        self.run_command(
            server,
            &RemoteCommand::Move {
                from: from.to_string(),
                to: to.to_string(),
            },
        )
        .await
        .map(|_| ())
    }
}
