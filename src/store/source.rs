use crate::*;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params_from_iter;

/// Source defines the read interface between tables and SQLite.
/// All catalog lookups and SELECT queries are consolidated here.
pub trait Source {
    /// Whether `sqlite_master` lists a table with this exact name.
    fn exists(&self, table: &str) -> Result<bool>;
    /// Column names in storage order. Fails if the table is absent.
    fn columns(&self, table: &str) -> Result<Vec<String>>;
    /// Row count.
    fn length(&self, table: &str) -> Result<usize>;
    /// Whether a row matches every `keys[i] IS values[i]`.
    fn contains(&self, table: &str, keys: &[&str], values: &[&Value]) -> Result<bool>;
    /// Runs arbitrary SQL and collects every row.
    fn select(&self, sql: &str) -> Result<Frame>;
}

impl Source for Connection {
    fn exists(&self, table: &str) -> Result<bool> {
        const SQL: &str = "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1";
        Ok(self
            .query_row(SQL, [table], |_| Ok(()))
            .optional()?
            .is_some())
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        let ref sql = format!("PRAGMA table_info({})", quote(table));
        let columns = self
            .prepare(sql)?
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        match columns.is_empty() {
            true => Err(Error::NotFound(format!("table {}", table))),
            false => Ok(columns),
        }
    }

    fn length(&self, table: &str) -> Result<usize> {
        let ref sql = format!("SELECT COUNT(*) FROM {}", quote(table));
        Ok(self.query_row(sql, [], |row| row.get::<_, i64>(0))? as usize)
    }

    fn contains(&self, table: &str, keys: &[&str], values: &[&Value]) -> Result<bool> {
        let ref sql = format!(
            "SELECT 1 FROM {} WHERE {} LIMIT 1",
            quote(table),
            keys.iter()
                .map(|k| format!("{} IS ?", quote(k)))
                .collect::<Vec<_>>()
                .join(" AND ")
        );
        Ok(self
            .prepare_cached(sql)?
            .query_row(params_from_iter(values), |_| Ok(()))
            .optional()?
            .is_some())
    }

    fn select(&self, sql: &str) -> Result<Frame> {
        let mut stmt = self.prepare(sql)?;
        let n = stmt.column_count();
        let mut frame = Frame::new(stmt.column_names());
        let rows = stmt
            .query_map([], |row| {
                (0..n)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for row in rows {
            frame.push(row)?;
        }
        Ok(frame)
    }
}
