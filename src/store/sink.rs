use crate::*;
use rusqlite::Connection;
use rusqlite::params_from_iter;

/// Sink defines the write interface between tables and SQLite.
/// All DDL and INSERT/UPDATE statements are consolidated here.
pub trait Sink {
    /// Issues the descriptor's `CREATE TABLE IF NOT EXISTS`.
    fn creates(&self, descriptor: &Descriptor) -> Result<()>;
    /// Issues `DROP TABLE IF EXISTS`.
    fn drops(&self, table: &str) -> Result<()>;
    /// Inserts one row of `values` into `columns`.
    fn insert(&self, table: &str, columns: &[&str], values: &[&Value]) -> Result<()>;
    /// Sets `columns` to `values` on the row where every `keys[i] IS key[i]`.
    fn update(
        &self,
        table: &str,
        keys: &[&str],
        key: &[&Value],
        columns: &[&str],
        values: &[&Value],
    ) -> Result<()>;
}

impl Sink for Connection {
    fn creates(&self, descriptor: &Descriptor) -> Result<()> {
        Ok(self.execute_batch(&descriptor.creates())?)
    }

    fn drops(&self, table: &str) -> Result<()> {
        let ref sql = format!("DROP TABLE IF EXISTS {}", quote(table));
        Ok(self.execute_batch(sql)?)
    }

    fn insert(&self, table: &str, columns: &[&str], values: &[&Value]) -> Result<()> {
        let ref sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            quotes(columns),
            vec!["?"; columns.len()].join(", ")
        );
        self.prepare_cached(sql)?
            .execute(params_from_iter(values))?;
        Ok(())
    }

    fn update(
        &self,
        table: &str,
        keys: &[&str],
        key: &[&Value],
        columns: &[&str],
        values: &[&Value],
    ) -> Result<()> {
        let ref sql = format!(
            "UPDATE {} SET {} WHERE {}",
            quote(table),
            columns
                .iter()
                .map(|c| format!("{} = ?", quote(c)))
                .collect::<Vec<_>>()
                .join(", "),
            keys.iter()
                .map(|k| format!("{} IS ?", quote(k)))
                .collect::<Vec<_>>()
                .join(" AND ")
        );
        self.prepare_cached(sql)?
            .execute(params_from_iter(values.iter().chain(key)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE kv (k INTEGER PRIMARY KEY, v TEXT, w TEXT)")
            .unwrap();
        conn
    }

    fn fetch(conn: &Connection, k: i64) -> (String, String) {
        conn.query_row("SELECT v, w FROM kv WHERE k = ?1", [k], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap()
    }

    #[test]
    fn insert_binds_in_column_order() {
        let conn = memory();
        let ref k = Value::Integer(7);
        let ref w = Value::from("west");
        let ref v = Value::from("vest");
        conn.insert("kv", &["k", "w", "v"], &[k, w, v]).unwrap();
        assert_eq!(fetch(&conn, 7), ("vest".into(), "west".into()));
    }

    #[test]
    fn update_leaves_keys_and_other_columns() {
        let conn = memory();
        conn.execute("INSERT INTO kv VALUES (1, 'a', 'x')", []).unwrap();
        let ref k = Value::Integer(1);
        let ref v = Value::from("b");
        conn.update("kv", &["k"], &[k], &["v"], &[v]).unwrap();
        assert_eq!(fetch(&conn, 1), ("b".into(), "x".into()));
    }

    #[test]
    fn drops_is_idempotent() {
        let conn = memory();
        conn.drops("kv").unwrap();
        conn.drops("kv").unwrap();
        assert!(!conn.exists("kv").unwrap());
    }

    #[test]
    fn creates_from_descriptor() {
        let conn = memory();
        let descriptor = Descriptor::new(
            "scores",
            [("player", "TEXT"), ("round", "INTEGER"), ("points", "REAL")],
            ["player", "round"],
        )
        .unwrap();
        conn.creates(&descriptor).unwrap();
        assert_eq!(conn.columns("scores").unwrap(), vec!["player", "round", "points"]);
    }
}
