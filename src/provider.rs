//! Connection provisioning - one connection per store call
//!
//! The store never owns a connection; it borrows a fresh one from a
//! [`ConnectionProvider`] for each operation and is responsible for
//! releasing everything it opened during that call. Provider failures
//! surface as [`Error::ConnectionUnavailable`] and are never retried here.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use crate::{Error, Result};

/// Hands out a live database connection per call.
pub trait ConnectionProvider: Send + Sync {
    /// Acquire a usable connection, or fail with
    /// [`Error::ConnectionUnavailable`].
    fn acquire(&self) -> Result<Connection>;
}

enum Target {
    /// A database file on disk, created on first open.
    File(PathBuf),
    /// A named in-memory database shared by every connection this provider
    /// opens. The anchor connection keeps the database alive between calls.
    Memory {
        uri: String,
        _anchor: Mutex<Connection>,
    },
}

/// SQLite connection provider.
///
/// Opens a fresh connection per [`acquire`](ConnectionProvider::acquire),
/// so connections are never shared across calls. An optional busy timeout
/// is applied to every connection handed out, which is how a per-call
/// deadline reaches the engine.
pub struct SqliteProvider {
    target: Target,
    busy_timeout: Option<Duration>,
}

const OPEN_FLAGS: OpenFlags = OpenFlags::SQLITE_OPEN_READ_WRITE
    .union(OpenFlags::SQLITE_OPEN_CREATE)
    .union(OpenFlags::SQLITE_OPEN_URI)
    .union(OpenFlags::SQLITE_OPEN_NO_MUTEX);

impl SqliteProvider {
    /// Provider over a database file (created if it doesn't exist).
    pub fn open(path: &Path) -> Self {
        Self {
            target: Target::File(path.to_path_buf()),
            busy_timeout: None,
        }
    }

    /// Provider over a named shared-memory database.
    ///
    /// Every connection opened by this provider sees the same data; the
    /// database lives as long as the provider does.
    pub fn in_memory(name: &str) -> Result<Self> {
        let uri = format!("file:{name}?mode=memory&cache=shared");
        let anchor = Connection::open_with_flags(&uri, OPEN_FLAGS)
            .map_err(|e| Error::ConnectionUnavailable(e.to_string()))?;
        Ok(Self {
            target: Target::Memory {
                uri,
                _anchor: Mutex::new(anchor),
            },
            busy_timeout: None,
        })
    }

    /// Apply a busy timeout to every connection this provider hands out.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }
}

impl ConnectionProvider for SqliteProvider {
    fn acquire(&self) -> Result<Connection> {
        let conn = match &self.target {
            Target::File(path) => Connection::open_with_flags(path, OPEN_FLAGS),
            Target::Memory { uri, .. } => Connection::open_with_flags(uri, OPEN_FLAGS),
        }
        .map_err(|e| Error::ConnectionUnavailable(e.to_string()))?;
        if let Some(timeout) = self.busy_timeout {
            conn.busy_timeout(timeout)
                .map_err(|e| Error::ConnectionUnavailable(e.to_string()))?;
        }
        Ok(conn)
    }
}
