use crate::*;
use rusqlite::Connection;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use std::path::Path;
use std::path::PathBuf;

/// Scope runs one unit of work against one database file.
///
/// Every call opens a fresh connection, wraps the work in a transaction,
/// commits only if the work returned `Ok`, and closes the connection before
/// returning. An `Err` drops the transaction, which rolls it back, so a
/// failed operation never persists partially. Handles are never held
/// across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    path: PathBuf,
}

impl Scope {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `operation` inside a deferred transaction.
    pub fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        self.with(TransactionBehavior::Deferred, operation)
    }

    /// Runs `operation` inside an immediate transaction.
    ///
    /// The write lock is taken before `operation` starts, so reads made
    /// inside it cannot be invalidated by another writer before commit.
    pub fn write<T, F>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        self.with(TransactionBehavior::Immediate, operation)
    }

    fn with<T, F>(&self, behavior: TransactionBehavior, operation: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let ref mut conn = self.open()?;
        let output = {
            let tx = conn.transaction_with_behavior(behavior)?;
            let output = operation(&tx)?;
            tx.commit()?;
            output
        };
        Ok(output)
    }

    fn open(&self) -> Result<Connection> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        log::debug!("opening database ({})", self.path.display());
        Ok(Connection::open(&self.path)?)
    }
}
