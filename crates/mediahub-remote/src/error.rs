//! Errors raised by the remote command channel.

use thiserror::Error;

use mediahub_core::error::{AppError, ErrorKind};
use mediahub_core::types::ServerId;

/// Failure of a single remote round trip.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No server with this id is configured.
    #[error("Unknown media server: {0}")]
    UnknownServer(ServerId),

    /// The channel could not be established or was lost mid-command.
    #[error("Connection to {host} failed: {message}")]
    Connection {
        /// Target host.
        host: String,
        /// Client diagnostics.
        message: String,
    },

    /// The server rejected our credentials.
    #[error("Authorization rejected by {host}: {message}")]
    Authorization {
        /// Target host.
        host: String,
        /// Client diagnostics.
        message: String,
    },

    /// No reply within the configured bound. The command may still have run.
    #[error("Remote command timed out after {0} seconds")]
    Timeout(u64),

    /// The command ran and exited with a non-zero status.
    #[error("Remote command `{command}` exited with code {code}: {stderr}")]
    CommandFailed {
        /// Kind of command that failed.
        command: String,
        /// Exit status.
        code: i32,
        /// Captured standard error (truncated).
        stderr: String,
    },

    /// The local client process could not be spawned.
    #[error("Failed to spawn remote client: {0}")]
    Spawn(#[from] std::io::Error),
}

impl RemoteError {
    /// Whether repeating the same idempotent command may succeed.
    ///
    /// Authorization failures and non-zero exits are deterministic and
    /// never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout(_))
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError::with_source(ErrorKind::RemoteExecution, err.to_string(), err)
    }
}
