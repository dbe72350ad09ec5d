//! Remote media server configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::ServerId;

/// How commands reach the media servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemoteTransport {
    /// Spawn the system `ssh` client for every command.
    #[default]
    Ssh,
    /// Run commands with `sh -c` on this host (single-host deployments).
    Local,
}

/// Remote command channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Transport used to execute folder commands.
    #[serde(default)]
    pub transport: RemoteTransport,
    /// Content root on every media server. Folder directories live at
    /// `<content_root>/<owner_login>/<folder_name>`.
    #[serde(default = "default_content_root")]
    pub content_root: String,
    /// Upper bound for a single remote round trip, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,
    /// Attempts for idempotent operations on transient failures.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff between attempts in milliseconds (grows linearly).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Server used for new folders when the owner has none yet.
    #[serde(default)]
    pub default_server: Option<ServerId>,
    /// Path to the ssh client binary.
    #[serde(default = "default_ssh_binary")]
    pub ssh_binary: String,
    /// Known media servers.
    #[serde(default)]
    pub servers: Vec<RemoteServerConfig>,
}

/// A single media server reachable over ssh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteServerConfig {
    /// Identifier stored on folder records.
    pub id: ServerId,
    /// Hostname or IP address.
    pub host: String,
    /// SSH port.
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// Remote user.
    #[serde(default = "default_ssh_user")]
    pub user: String,
    /// Private key passed as `-i`.
    #[serde(default)]
    pub identity_file: Option<String>,
}

impl RemoteConfig {
    /// The configured default server, falling back to the first listed one.
    pub fn resolve_default_server(&self) -> Result<ServerId, AppError> {
        self.default_server
            .or_else(|| self.servers.first().map(|s| s.id))
            .ok_or_else(|| {
                AppError::configuration(
                    "remote.default_server is not set and remote.servers is empty",
                )
            })
    }

    /// Look up a server by id.
    pub fn server(&self, id: ServerId) -> Option<&RemoteServerConfig> {
        self.servers.iter().find(|s| s.id == id)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            transport: RemoteTransport::default(),
            content_root: default_content_root(),
            command_timeout_seconds: default_command_timeout(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            default_server: None,
            ssh_binary: default_ssh_binary(),
            servers: Vec::new(),
        }
    }
}

fn default_content_root() -> String {
    "/usr/local/WowzaStreamingEngine/content".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    250
}

fn default_ssh_binary() -> String {
    "ssh".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_ssh_user() -> String {
    "root".to_string()
}
