//! Local version control.
//!
//! [`probe`] answers read-only questions through `git2` and never fails;
//! [`command::Git`] drives the `git` binary for the operations that change a
//! repository.

pub mod command;
pub mod probe;
pub mod remote;

use serde::Serialize;

pub use command::Git;
pub use probe::{VcsStatus, probe};
pub use remote::RemoteUrl;

/// One commit as listed by `info` and the debug dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub subject: String,
    pub author: String,
    pub short_hash: String,
    /// Author date, strict ISO 8601.
    pub date: String,
}
