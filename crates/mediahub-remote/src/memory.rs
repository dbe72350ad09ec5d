//! In-memory folder executor for development and testing.
//!
//! Simulates the directory tree of every media server without any process
//! or network, records every command it receives, and can be told to fail.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use mediahub_core::result::AppResult;
use mediahub_core::types::ServerId;

use crate::command::{CommandKind, PROBE_EXISTS, PROBE_MISSING, RemoteCommand};
use crate::error::RemoteError;
use crate::executor::{CommandOutput, RemoteFolderExecutor};
use crate::paths::RemotePaths;
use crate::retry::RetryPolicy;

/// A scheduled failure for one kind of command.
#[derive(Debug, Clone, Copy)]
struct Injected {
    /// Remaining commands of this kind that will fail.
    remaining: usize,
    /// Fail with a connection error (retried) instead of a non-zero exit.
    transient: bool,
}

/// In-memory executor that behaves like `mkdir -p`, `rm -rf`, `test -d`
/// and `mv` over a set of directory paths per server.
#[derive(Debug)]
pub struct MemoryFolderExecutor {
    /// Existing directories per server.
    dirs: Mutex<HashMap<ServerId, BTreeSet<String>>>,
    /// Every command received, in order, including failed attempts.
    calls: Mutex<Vec<(ServerId, RemoteCommand)>>,
    /// Scheduled failures.
    failures: Mutex<HashMap<CommandKind, Injected>>,
    /// Artificial delay per command.
    latency: Mutex<Duration>,
    /// Retry policy for idempotent commands.
    retry: RetryPolicy,
    /// Content root.
    paths: RemotePaths,
}

impl MemoryFolderExecutor {
    /// Create an empty executor rooted at `content_root`.
    pub fn new(content_root: impl Into<String>) -> Self {
        Self::with_retry(content_root, RetryPolicy::new(3, Duration::ZERO))
    }

    /// Create an empty executor with an explicit retry policy.
    pub fn with_retry(content_root: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            dirs: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            latency: Mutex::new(Duration::ZERO),
            retry,
            paths: RemotePaths::new(content_root),
        }
    }

    /// Make the next `times` commands of `kind` exit non-zero.
    pub fn fail_next(&self, kind: CommandKind, times: usize) {
        self.inject(kind, times, false);
    }

    /// Make the next `times` commands of `kind` lose the connection.
    pub fn disconnect_next(&self, kind: CommandKind, times: usize) {
        self.inject(kind, times, true);
    }

    fn inject(&self, kind: CommandKind, remaining: usize, transient: bool) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.insert(kind, Injected { remaining, transient });
    }

    /// Delay every command by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Seed an existing directory, as if created out of band.
    pub fn add_directory(&self, server: ServerId, path: &str) {
        let mut dirs = self.dirs.lock().unwrap_or_else(|e| e.into_inner());
        make_dir(dirs.entry(server).or_default(), path);
    }

    /// Whether `path` exists on `server`.
    pub fn has_directory(&self, server: ServerId, path: &str) -> bool {
        let dirs = self.dirs.lock().unwrap_or_else(|e| e.into_inner());
        dirs.get(&server).is_some_and(|set| set.contains(path))
    }

    /// Direct children of `path` on `server`.
    pub fn children(&self, server: ServerId, path: &str) -> Vec<String> {
        let dirs = self.dirs.lock().unwrap_or_else(|e| e.into_inner());
        let prefix = format!("{path}/");
        dirs.get(&server)
            .map(|set| {
                set.iter()
                    .filter_map(|d| d.strip_prefix(&prefix))
                    .filter(|rest| !rest.contains('/'))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every command received so far.
    pub fn calls(&self) -> Vec<(ServerId, RemoteCommand)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of commands received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn take_failure(&self, kind: CommandKind) -> Option<RemoteError> {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let injected = failures.get_mut(&kind)?;
        if injected.remaining == 0 {
            return None;
        }
        injected.remaining -= 1;

        Some(if injected.transient {
            RemoteError::Connection {
                host: "memory".to_string(),
                message: "Connection reset by peer".to_string(),
            }
        } else {
            RemoteError::CommandFailed {
                command: kind.to_string(),
                code: 1,
                stderr: "injected failure".to_string(),
            }
        })
    }

    async fn execute_once(
        &self,
        server: ServerId,
        command: &RemoteCommand,
    ) -> Result<CommandOutput, RemoteError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((server, command.clone()));

        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(err) = self.take_failure(command.kind()) {
            tracing::debug!(command = %command.kind(), error = %err, "[MemoryExecutor] Injected failure");
            return Err(err);
        }

        let mut dirs = self.dirs.lock().unwrap_or_else(|e| e.into_inner());
        let set = dirs.entry(server).or_default();

        let stdout = match command {
            RemoteCommand::MakeDir { path } => {
                make_dir(set, path);
                String::new()
            }
            RemoteCommand::RemoveDir { path } => {
                let prefix = format!("{path}/");
                set.retain(|d| d != path && !d.starts_with(&prefix));
                String::new()
            }
            RemoteCommand::Probe { path } => {
                let marker = if set.contains(path) {
                    PROBE_EXISTS
                } else {
                    PROBE_MISSING
                };
                format!("{marker}\n")
            }
            RemoteCommand::Move { from, to } => {
                if !set.contains(from) {
                    return Err(RemoteError::CommandFailed {
                        command: CommandKind::Move.to_string(),
                        code: 1,
                        stderr: format!("mv: cannot stat '{from}': No such file or directory"),
                    });
                }
                // Like mv, moving onto an existing directory nests the source inside it.
                let target = if set.contains(to) {
                    let base = from.rsplit('/').next().unwrap_or(from);
                    format!("{to}/{base}")
                } else {
                    to.clone()
                };
                let prefix = format!("{from}/");
                let moved: Vec<String> = set
                    .iter()
                    .filter(|d| *d == from || d.starts_with(&prefix))
                    .cloned()
                    .collect();
                for old in moved {
                    set.remove(&old);
                    set.insert(format!("{target}{}", &old[from.len()..]));
                }
                String::new()
            }
        };

        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

/// `mkdir -p`: insert `path` and every ancestor.
fn make_dir(set: &mut BTreeSet<String>, path: &str) {
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);
        set.insert(current.clone());
    }
}

#[async_trait]
impl RemoteFolderExecutor for MemoryFolderExecutor {
    fn transport(&self) -> &str {
        "memory"
    }

    fn paths(&self) -> &RemotePaths {
        &self.paths
    }

    async fn run_command(
        &self,
        server: ServerId,
        command: &RemoteCommand,
    ) -> AppResult<CommandOutput> {
        Ok(self
            .retry
            .run(command, || self.execute_once(server, command))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_folder_twice_leaves_one_directory() {
        let exec = MemoryFolderExecutor::new("/content");
        let server = ServerId::new();

        exec.create_folder(server, "bob", "clips").await.unwrap();
        exec.create_folder(server, "bob", "clips").await.unwrap();

        assert_eq!(exec.children(server, "/content/bob"), vec!["clips".to_string()]);
    }

    #[tokio::test]
    async fn test_move_carries_subdirectories() {
        let exec = MemoryFolderExecutor::new("/content");
        let server = ServerId::new();
        exec.add_directory(server, "/content/bob/alpha/hls");

        exec.move_directory(server, "/content/bob/alpha", "/content/bob/beta")
            .await
            .unwrap();

        assert!(exec.has_directory(server, "/content/bob/beta/hls"));
        assert!(!exec.has_directory(server, "/content/bob/alpha"));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let exec = MemoryFolderExecutor::new("/content");
        let server = ServerId::new();
        exec.disconnect_next(CommandKind::MakeDir, 1);

        exec.ensure_base_directory(server, "bob").await.unwrap();

        assert_eq!(exec.call_count(), 2);
        assert!(exec.has_directory(server, "/content/bob"));
    }

    #[tokio::test]
    async fn test_injected_exit_failure_is_not_retried() {
        let exec = MemoryFolderExecutor::new("/content");
        let server = ServerId::new();
        exec.fail_next(CommandKind::RemoveDir, 1);

        assert!(exec.remove_directory(server, "/content/bob/x").await.is_err());
        assert_eq!(exec.call_count(), 1);
        assert!(exec.remove_directory(server, "/content/bob/x").await.is_ok());
    }
}
