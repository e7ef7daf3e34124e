use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use super::schema::apply_pragmas;
use crate::error::Result;

/// A single SQLite connection shared behind a mutex.
pub struct ConnectionPool {
    path: Option<String>,
    connection: Mutex<Connection>,
}

impl ConnectionPool {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        Ok(Self {
            path: Some(path.to_string_lossy().to_string()),
            connection: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_pragmas(&conn)?;
        Ok(Self {
            path: None,
            connection: Mutex::new(conn),
        })
    }

    /// Lock the connection. A poisoned lock is recovered.
    pub fn get_connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
