//! Folder executor that reaches media servers through the system ssh client.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use mediahub_core::config::{RemoteConfig, RemoteServerConfig};
use mediahub_core::result::AppResult;
use mediahub_core::types::ServerId;

use crate::command::RemoteCommand;
use crate::error::RemoteError;
use crate::executor::{CommandOutput, RemoteFolderExecutor};
use crate::paths::RemotePaths;
use crate::retry::RetryPolicy;

/// Exit status the OpenSSH client reserves for its own failures.
const SSH_CLIENT_FAILURE: i32 = 255;

/// Captured stderr kept in errors and logs.
const STDERR_LIMIT: usize = 2000;

/// Runs every command as `ssh <server> -- <command>`.
///
/// Uses `BatchMode` so a missing key fails fast instead of prompting.
#[derive(Debug, Clone)]
pub struct SshFolderExecutor {
    /// Known servers by id.
    servers: HashMap<ServerId, RemoteServerConfig>,
    /// Path to the ssh binary.
    ssh_binary: String,
    /// Bound on a single round trip.
    timeout: Duration,
    /// Retry policy for idempotent commands.
    retry: RetryPolicy,
    /// Content root on every server.
    paths: RemotePaths,
}

impl SshFolderExecutor {
    /// Create an executor from the `remote` config section.
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            servers: config
                .servers
                .iter()
                .map(|s| (s.id, s.clone()))
                .collect(),
            ssh_binary: config.ssh_binary.clone(),
            timeout: Duration::from_secs(config.command_timeout_seconds),
            retry: RetryPolicy::from_config(config),
            paths: RemotePaths::new(config.content_root.clone()),
        }
    }

    fn server(&self, id: ServerId) -> Result<&RemoteServerConfig, RemoteError> {
        self.servers.get(&id).ok_or(RemoteError::UnknownServer(id))
    }

    /// A single attempt, bounded by the configured timeout.
    async fn execute_once(
        &self,
        server: &RemoteServerConfig,
        command: &RemoteCommand,
    ) -> Result<CommandOutput, RemoteError> {
        let start = Instant::now();
        let args = ssh_args(server, self.timeout, &command.render());

        let mut cmd = Command::new(&self.ssh_binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(host = %server.host, error = %e, "Failed to spawn ssh client");
                return Err(RemoteError::Spawn(e));
            }
            Err(_) => {
                error!(
                    host = %server.host,
                    command = %command.kind(),
                    timeout_secs = self.timeout.as_secs(),
                    "Remote command timed out"
                );
                return Err(RemoteError::Timeout(self.timeout.as_secs()));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        debug!(
            host = %server.host,
            command = %command.kind(),
            exit_code = code,
            duration_ms = start.elapsed().as_millis() as u64,
            "Remote command finished"
        );

        if code != 0 {
            return Err(classify_failure(&server.host, command, code, &stderr));
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: code,
        })
    }
}

#[async_trait]
impl RemoteFolderExecutor for SshFolderExecutor {
    fn transport(&self) -> &str {
        "ssh"
    }

    fn paths(&self) -> &RemotePaths {
        &self.paths
    }

    async fn run_command(
        &self,
        server: ServerId,
        command: &RemoteCommand,
    ) -> AppResult<CommandOutput> {
        let target = self.server(server)?;
        Ok(self
            .retry
            .run(command, || self.execute_once(target, command))
            .await?)
    }
}

/// Arguments for `ssh` running `remote_command` on `server`.
pub fn ssh_args(server: &RemoteServerConfig, timeout: Duration, remote_command: &str) -> Vec<String> {
    let mut args = vec![
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={}", timeout.as_secs().max(1)),
        "-p".to_string(),
        server.port.to_string(),
    ];
    if let Some(key) = &server.identity_file {
        args.push("-i".to_string());
        args.push(key.clone());
    }
    args.push(format!("{}@{}", server.user, server.host));
    args.push("--".to_string());
    args.push(remote_command.to_string());
    args
}

/// Map a non-zero ssh exit into a [`RemoteError`].
pub fn classify_failure(host: &str, command: &RemoteCommand, code: i32, stderr: &str) -> RemoteError {
    let stderr: String = stderr.trim().chars().take(STDERR_LIMIT).collect();

    if code == SSH_CLIENT_FAILURE {
        if stderr.contains("Permission denied") || stderr.contains("Host key verification failed")
        {
            return RemoteError::Authorization {
                host: host.to_string(),
                message: stderr,
            };
        }
        return RemoteError::Connection {
            host: host.to_string(),
            message: stderr,
        };
    }

    RemoteError::CommandFailed {
        command: command.kind().to_string(),
        code,
        stderr,
    }
}
