//! Folder executor that runs commands with `sh -c` on this host.
//!
//! Every server id maps to the local content root. Useful when the media
//! server and MediaHub share a machine, and in tests.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use mediahub_core::config::RemoteConfig;
use mediahub_core::result::AppResult;
use mediahub_core::types::ServerId;

use crate::command::RemoteCommand;
use crate::error::RemoteError;
use crate::executor::{CommandOutput, RemoteFolderExecutor};
use crate::paths::RemotePaths;
use crate::retry::RetryPolicy;

/// Runs commands through the local POSIX shell.
#[derive(Debug, Clone)]
pub struct LocalFolderExecutor {
    /// Bound on a single command.
    timeout: Duration,
    /// Retry policy for idempotent commands.
    retry: RetryPolicy,
    /// Local content root.
    paths: RemotePaths,
}

impl LocalFolderExecutor {
    /// Create an executor from the `remote` config section.
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_root(
            config.content_root.clone(),
            Duration::from_secs(config.command_timeout_seconds),
            RetryPolicy::from_config(config),
        )
    }

    /// Create an executor for an explicit content root.
    pub fn with_root(content_root: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            timeout,
            retry,
            paths: RemotePaths::new(content_root),
        }
    }

    async fn execute_once(&self, command: &RemoteCommand) -> Result<CommandOutput, RemoteError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command.render())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| RemoteError::Timeout(self.timeout.as_secs()))??;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        debug!(command = %command.kind(), exit_code = code, "Local command finished");

        if code != 0 {
            return Err(RemoteError::CommandFailed {
                command: command.kind().to_string(),
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: code,
        })
    }
}

#[async_trait]
impl RemoteFolderExecutor for LocalFolderExecutor {
    fn transport(&self) -> &str {
        "local"
    }

    fn paths(&self) -> &RemotePaths {
        &self.paths
    }

    async fn run_command(
        &self,
        _server: ServerId,
        command: &RemoteCommand,
    ) -> AppResult<CommandOutput> {
        Ok(self.retry.run(command, || self.execute_once(command)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(root: &std::path::Path) -> LocalFolderExecutor {
        LocalFolderExecutor::with_root(
            root.to_string_lossy().to_string(),
            Duration::from_secs(10),
            RetryPolicy::none(),
        )
    }

    #[tokio::test]
    async fn test_create_folder_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(dir.path());
        let server = ServerId::new();

        exec.ensure_base_directory(server, "bob").await.unwrap();
        exec.create_folder(server, "bob", "clips").await.unwrap();
        exec.create_folder(server, "bob", "clips").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("bob"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(dir.path().join("bob/clips").is_dir());
    }

    #[tokio::test]
    async fn test_probe_move_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(dir.path());
        let server = ServerId::new();
        let paths = exec.paths().clone();
        let old = paths.folder_dir("bob", "it's alpha").unwrap();
        let new = paths.folder_dir("bob", "beta $HOME").unwrap();

        exec.create_folder(server, "bob", "it's alpha").await.unwrap();
        assert!(exec.directory_exists(server, &old).await.unwrap());
        assert!(!exec.directory_exists(server, &new).await.unwrap());

        exec.move_directory(server, &old, &new).await.unwrap();
        assert!(dir.path().join("bob/beta $HOME").is_dir());
        assert!(!dir.path().join("bob/it's alpha").exists());

        exec.remove_directory(server, &new).await.unwrap();
        exec.remove_directory(server, &new).await.unwrap();
        assert!(!dir.path().join("bob/beta $HOME").exists());
    }

    #[tokio::test]
    async fn test_failed_move_is_remote_error() {
        let dir = tempfile::tempdir().unwrap();
        let exec = executor(dir.path());
        let paths = exec.paths().clone();

        let err = exec
            .move_directory(
                ServerId::new(),
                &paths.folder_dir("bob", "missing").unwrap(),
                &paths.folder_dir("bob", "other").unwrap(),
            )
            .await
            .expect_err("source does not exist");
        assert_eq!(err.kind, mediahub_core::error::ErrorKind::RemoteExecution);
    }
}
