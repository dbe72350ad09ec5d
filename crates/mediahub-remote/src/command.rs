//! Typed shell commands sent to media servers.
//!
//! Commands are rendered to POSIX `sh` with every path single-quoted, so
//! folder names containing spaces, quotes, or `$` reach the server verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker printed by [`RemoteCommand::Probe`] when the directory exists.
pub const PROBE_EXISTS: &str = "EXISTS";
/// Marker printed by [`RemoteCommand::Probe`] when it does not.
pub const PROBE_MISSING: &str = "NOT_EXISTS";

/// The operations the lifecycle manager performs remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteCommand {
    /// `mkdir -p`: creates the directory and missing parents.
    MakeDir {
        /// Absolute remote path.
        path: String,
    },
    /// `rm -rf`: removes the directory tree; absence is not an error.
    RemoveDir {
        /// Absolute remote path.
        path: String,
    },
    /// Prints [`PROBE_EXISTS`] or [`PROBE_MISSING`]; always exits 0.
    Probe {
        /// Absolute remote path.
        path: String,
    },
    /// `mv`: renames a directory in place.
    Move {
        /// Current absolute path.
        from: String,
        /// New absolute path.
        to: String,
    },
}

/// Discriminant of [`RemoteCommand`], used for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// `mkdir -p`
    MakeDir,
    /// `rm -rf`
    RemoveDir,
    /// `test -d`
    Probe,
    /// `mv`
    Move,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MakeDir => "mkdir",
            Self::RemoveDir => "rm",
            Self::Probe => "probe",
            Self::Move => "mv",
        };
        f.write_str(name)
    }
}

impl RemoteCommand {
    /// The command discriminant.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::MakeDir { .. } => CommandKind::MakeDir,
            Self::RemoveDir { .. } => CommandKind::RemoveDir,
            Self::Probe { .. } => CommandKind::Probe,
            Self::Move { .. } => CommandKind::Move,
        }
    }

    /// Whether running the command twice leaves the same end state as once.
    ///
    /// `mv` is not: a repeated move fails once the source is gone.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Self::Move { .. })
    }

    /// Render as a single `sh` command line.
    pub fn render(&self) -> String {
        match self {
            Self::MakeDir { path } => format!("mkdir -p -- {}", shell_quote(path)),
            Self::RemoveDir { path } => format!("rm -rf -- {}", shell_quote(path)),
            Self::Probe { path } => format!(
                "if [ -d {} ]; then echo {PROBE_EXISTS}; else echo {PROBE_MISSING}; fi",
                shell_quote(path)
            ),
            Self::Move { from, to } => {
                format!("mv -- {} {}", shell_quote(from), shell_quote(to))
            }
        }
    }

    /// Interpret the stdout of a [`RemoteCommand::Probe`].
    pub fn parse_probe(stdout: &str) -> Option<bool> {
        match stdout.trim() {
            PROBE_EXISTS => Some(true),
            PROBE_MISSING => Some(false),
            _ => None,
        }
    }
}

/// Quote `value` for POSIX `sh` using single quotes.
pub fn shell_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}
