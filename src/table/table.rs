use crate::*;
use rusqlite::Connection;
use std::path::Path;
use std::path::PathBuf;

/// Table manages the lifecycle and contents of one declared table.
///
/// The table lives in `<dir>/<name>.db`. Every method opens its own
/// [`Scope`], so nothing is held between calls and a failed call leaves
/// the file as it was.
#[derive(Debug, Clone)]
pub struct Table {
    descriptor: Descriptor,
    scope: Scope,
}

/// Per-row outcomes of one ingestion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    inserted: usize,
    updated: usize,
    skipped: usize,
}

impl Tally {
    fn affected(&self) -> usize {
        self.inserted + self.updated
    }
}

impl Table {
    pub fn new(descriptor: Descriptor, dir: impl AsRef<Path>) -> Self {
        let file = format!("{}.{}", descriptor.name(), EXTENSION);
        let scope = Scope::new(dir.as_ref().join(file));
        Self { descriptor, scope }
    }

    /// Binds a statically declared table type.
    pub fn of<S: Schema>(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(S::descriptor()?, dir))
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Path of the database file; fails if it has not been created yet.
    pub fn path(&self) -> Result<PathBuf> {
        let path = self.scope.path();
        match path.exists() {
            true => Ok(path.to_path_buf()),
            false => Err(Error::NotFound(format!(
                "database file {} does not exist, create it first",
                path.display()
            ))),
        }
    }

    /// Opens a raw connection to the existing database file.
    pub fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(self.path()?)?)
    }

    pub fn exists(&self) -> Result<bool> {
        self.scope.run(|tx| tx.exists(self.name()))
    }

    /// Creates the table; an existing one is kept unless `overwrite`.
    pub fn create_table(&self, overwrite: bool) -> Result<()> {
        self.scope.write(|tx| {
            if tx.exists(self.name())? {
                if !overwrite {
                    log::info!("table exists, not overwriting ({})", self.name());
                    return Ok(());
                }
                log::info!("dropping  table ({})", self.name());
                tx.drops(self.name())?;
            }
            log::info!("creating  table ({})", self.name());
            tx.creates(&self.descriptor)
        })
    }

    pub fn drop_table(&self) -> Result<()> {
        self.scope.write(|tx| {
            log::info!("dropping  table ({})", self.name());
            tx.drops(self.name())
        })
    }

    /// Column names of the live table in storage order.
    pub fn columns(&self) -> Result<Vec<String>> {
        self.scope.run(|tx| tx.columns(self.name()))
    }

    /// Runs `sql` as-is and returns its rows.
    pub fn query(&self, sql: &str) -> Result<Frame> {
        log::debug!("querying  table ({}): {}", self.name(), sql);
        self.scope.run(|tx| tx.select(sql))
    }

    pub fn length(&self) -> Result<usize> {
        self.scope.run(|tx| tx.length(self.name()))
    }

    /// Ingests `batch`, returning the number of rows inserted or updated.
    ///
    /// With `load_date`, every row gets [`LOAD_DATE`] set to the current
    /// time. Columns are checked against the schema before anything is
    /// written. Without a primary key every row is appended. With one, each
    /// row in order is inserted if its key is new, updated (non-key columns
    /// only) if the key exists and `overwrite` is set, and skipped
    /// otherwise. The whole batch commits or rolls back together.
    pub fn ingest(&self, mut batch: Frame, load_date: bool, overwrite: bool) -> Result<usize> {
        if load_date {
            batch.assign(LOAD_DATE, Value::Text(timestamp()));
        }
        let columns = self.validate(batch.columns())?;
        if batch.is_empty() {
            log::info!("ingested  table ({}): empty batch", self.name());
            return Ok(0);
        }
        self.keyed(&columns)?;
        let (tally, length) = self.scope.write(|tx| {
            let tally = match self.descriptor.primary() {
                None => self.append(tx, &columns, &batch)?,
                Some(keys) => self.upsert(tx, keys, &columns, &batch, overwrite)?,
            };
            Ok((tally, tx.length(self.name())?))
        })?;
        log::debug!(
            "ingested  table ({}): {} inserted, {} updated, {} skipped",
            self.name(),
            tally.inserted,
            tally.updated,
            tally.skipped
        );
        log::info!(
            "ingested  table ({}): {} rows affected, {} rows total",
            self.name(),
            tally.affected(),
            length
        );
        Ok(tally.affected())
    }

    /// Resolves batch columns to their declared spelling.
    fn validate<'a>(&'a self, columns: &[String]) -> Result<Vec<&'a str>> {
        let mismatched = columns
            .iter()
            .filter(|c| self.descriptor.column(c).is_none())
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !mismatched.is_empty() {
            return Err(Error::Validation(format!(
                "column(s) not declared: {}",
                mismatched.join(", ")
            )));
        }
        let resolved = columns
            .iter()
            .filter_map(|c| self.descriptor.column(c))
            .collect::<Vec<_>>();
        let repeated = resolved
            .iter()
            .enumerate()
            .filter(|(i, c)| resolved[..*i].contains(c))
            .map(|(_, c)| *c)
            .collect::<Vec<_>>();
        if !repeated.is_empty() {
            return Err(Error::Validation(format!(
                "column(s) given more than once: {}",
                repeated.join(", ")
            )));
        }
        Ok(resolved)
    }

    /// Every primary-key column must be present to look rows up.
    fn keyed(&self, columns: &[&str]) -> Result<()> {
        let missing = self
            .descriptor
            .primary()
            .unwrap_or_default()
            .iter()
            .filter(|k| !columns.contains(&k.as_str()))
            .map(String::as_str)
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "primary key column(s) missing: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    fn append(&self, tx: &Connection, columns: &[&str], batch: &Frame) -> Result<Tally> {
        let mut tally = Tally::default();
        for row in batch.rows() {
            tx.insert(self.name(), columns, &row.iter().collect::<Vec<_>>())?;
            tally.inserted += 1;
        }
        Ok(tally)
    }

    fn upsert(
        &self,
        tx: &Connection,
        keys: &[String],
        columns: &[&str],
        batch: &Frame,
        overwrite: bool,
    ) -> Result<Tally> {
        let keys = keys.iter().map(String::as_str).collect::<Vec<_>>();
        let locate = |c: &&str| columns.iter().position(|x| x == c);
        let k_idx = keys.iter().filter_map(locate).collect::<Vec<_>>();
        let v_idx = (0..columns.len())
            .filter(|i| !self.descriptor.is_key(columns[*i]))
            .collect::<Vec<_>>();
        let updates = v_idx.iter().map(|&i| columns[i]).collect::<Vec<_>>();
        let mut tally = Tally::default();
        for row in batch.rows() {
            let key = k_idx.iter().map(|&i| &row[i]).collect::<Vec<_>>();
            match (tx.contains(self.name(), &keys, &key)?, overwrite) {
                (false, _) => {
                    tx.insert(self.name(), columns, &row.iter().collect::<Vec<_>>())?;
                    tally.inserted += 1;
                }
                (true, true) => {
                    if !updates.is_empty() {
                        let values = v_idx.iter().map(|&i| &row[i]).collect::<Vec<_>>();
                        tx.update(self.name(), &keys, &key, &updates, &values)?;
                    }
                    tally.updated += 1;
                }
                (true, false) => tally.skipped += 1,
            }
        }
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn users(dir: &TempDir) -> Table {
        let d = Descriptor::new("users", [("id", "INTEGER"), ("name", "TEXT")], ["id"]).unwrap();
        let table = Table::new(d, dir.path());
        table.create_table(false).unwrap();
        table
    }

    fn lines(dir: &TempDir) -> Table {
        let d = Descriptor::new(
            "lines",
            [("line", "TEXT"), ("LOAD_DATE", "TEXT")],
            Vec::<String>::new(),
        )
        .unwrap();
        let table = Table::new(d, dir.path());
        table.create_table(false).unwrap();
        table
    }

    fn batch(rows: &[(i64, &str)]) -> Frame {
        rows.iter().fold(Frame::new(["id", "name"]), |f, (id, name)| {
            f.with([Value::from(*id), Value::from(*name)]).unwrap()
        })
    }

    fn name_of(table: &Table, id: i64) -> Value {
        let frame = table
            .query(&format!("SELECT name FROM users WHERE id = {}", id))
            .unwrap();
        frame.get(0, "name").cloned().unwrap_or(Value::Null)
    }

    #[test]
    fn upsert_scenario() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        assert_eq!(table.ingest(batch(&[(1, "A")]), false, false).unwrap(), 1);
        assert_eq!(table.length().unwrap(), 1);
        assert_eq!(table.ingest(batch(&[(1, "B")]), false, false).unwrap(), 0);
        assert_eq!(table.length().unwrap(), 1);
        assert_eq!(name_of(&table, 1), Value::from("A"));
        assert_eq!(table.ingest(batch(&[(1, "B")]), false, true).unwrap(), 1);
        assert_eq!(table.length().unwrap(), 1);
        assert_eq!(name_of(&table, 1), Value::from("B"));
    }

    #[test]
    fn upsert_twice_keeps_length() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = batch(&[(1, "a"), (2, "b"), (3, "c")]);
        table.ingest(rows.clone(), false, true).unwrap();
        let before = table.length().unwrap();
        assert_eq!(table.ingest(rows, false, true).unwrap(), 3);
        assert_eq!(table.length().unwrap(), before);
    }

    #[test]
    fn duplicate_keys_in_batch_last_wins() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        assert_eq!(table.ingest(batch(&[(1, "a"), (1, "b")]), false, true).unwrap(), 2);
        assert_eq!(table.length().unwrap(), 1);
        assert_eq!(name_of(&table, 1), Value::from("b"));
    }

    #[test]
    fn duplicate_keys_in_batch_first_wins_without_overwrite() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        assert_eq!(table.ingest(batch(&[(1, "a"), (1, "b")]), false, false).unwrap(), 1);
        assert_eq!(name_of(&table, 1), Value::from("a"));
    }

    #[test]
    fn append_grows_by_batch_size() {
        let tmp = TempDir::new().unwrap();
        let table = lines(&tmp);
        let rows = Frame::from_records((0..5).map(|i| vec![("line", Value::from(format!("l{}", i)))]));
        assert_eq!(table.ingest(rows.clone(), false, false).unwrap(), 5);
        assert_eq!(table.ingest(rows, false, true).unwrap(), 5);
        assert_eq!(table.length().unwrap(), 10);
    }

    #[test]
    fn load_date_is_stamped() {
        let tmp = TempDir::new().unwrap();
        let table = lines(&tmp);
        let rows = Frame::new(["line"]).with([Value::from("x")]).unwrap();
        table.ingest(rows, true, false).unwrap();
        let stamp = table.query("SELECT LOAD_DATE FROM lines").unwrap();
        match stamp.get(0, "LOAD_DATE") {
            Some(Value::Text(s)) => {
                assert!(chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP).is_ok())
            }
            other => panic!("unexpected load date {:?}", other),
        }
    }

    #[test]
    fn load_date_must_be_declared() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let err = table.ingest(batch(&[(1, "a")]), true, false).unwrap_err();
        assert!(err.to_string().contains(LOAD_DATE));
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn unknown_columns_fail_before_writing() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = Frame::new(["foo", "id", "bar"])
            .with([Value::Null, Value::from(1), Value::Null])
            .unwrap();
        match table.ingest(rows, false, true) {
            Err(Error::Validation(msg)) => assert!(msg.ends_with("foo, bar")),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn columns_match_ignoring_case() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = Frame::new(["ID", "Name"])
            .with([Value::from(4), Value::from("d")])
            .unwrap();
        assert_eq!(table.ingest(rows, false, false).unwrap(), 1);
        assert_eq!(name_of(&table, 4), Value::from("d"));
    }

    #[test]
    fn missing_key_column_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = Frame::new(["name"]).with([Value::from("x")]).unwrap();
        assert!(matches!(table.ingest(rows, false, false), Err(Error::Validation(_))));
    }

    #[test]
    fn storage_failure_rolls_back_batch() {
        let tmp = TempDir::new().unwrap();
        let d = Descriptor::new(
            "strict",
            [("id", "INTEGER"), ("name", "TEXT NOT NULL")],
            ["id"],
        )
        .unwrap();
        let table = Table::new(d, tmp.path());
        table.create_table(false).unwrap();
        let rows = Frame::new(["id", "name"])
            .with([Value::from(1), Value::from("ok")])
            .unwrap()
            .with([Value::from(2), Value::Null])
            .unwrap();
        assert!(matches!(table.ingest(rows, false, false), Err(Error::Storage(_))));
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        assert_eq!(table.ingest(Frame::new(["id", "name"]), false, true).unwrap(), 0);
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn columnless_empty_batch_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = Frame::from_records(Vec::<Vec<(String, Value)>>::new());
        assert!(rows.columns().is_empty());
        assert_eq!(table.ingest(rows, false, true).unwrap(), 0);
        assert_eq!(table.ingest(Frame::default(), false, false).unwrap(), 0);
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn empty_batch_still_rejects_unknown_columns() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        let rows = Frame::new(["foo"]);
        assert!(matches!(table.ingest(rows, false, false), Err(Error::Validation(_))));
    }

    #[test]
    fn key_only_rows_count_as_updated() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        table.ingest(batch(&[(1, "a")]), false, false).unwrap();
        let rows = Frame::new(["id"]).with([Value::from(1)]).unwrap();
        assert_eq!(table.ingest(rows, false, true).unwrap(), 1);
        assert_eq!(name_of(&table, 1), Value::from("a"));
    }

    #[test]
    fn composite_keys_update_non_key_columns() {
        let tmp = TempDir::new().unwrap();
        let d = Descriptor::new(
            "prices",
            [("ticker", "TEXT"), ("day", "TEXT"), ("close", "REAL")],
            ["ticker", "day"],
        )
        .unwrap();
        let table = Table::new(d, tmp.path());
        table.create_table(false).unwrap();
        let day = |t: &str, d: &str, c: f64| {
            Frame::new(["day", "close", "ticker"])
                .with([Value::from(d), Value::from(c), Value::from(t)])
                .unwrap()
        };
        table.ingest(day("X", "mon", 1.0), false, false).unwrap();
        table.ingest(day("X", "tue", 2.0), false, false).unwrap();
        table.ingest(day("X", "mon", 3.0), false, true).unwrap();
        let frame = table
            .query("SELECT close FROM prices WHERE ticker = 'X' ORDER BY day")
            .unwrap();
        assert_eq!(table.length().unwrap(), 2);
        assert_eq!(frame.get(0, "close"), Some(&Value::Real(3.0)));
        assert_eq!(frame.get(1, "close"), Some(&Value::Real(2.0)));
    }

    #[test]
    fn create_twice_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        table.ingest(batch(&[(1, "a")]), false, false).unwrap();
        table.create_table(false).unwrap();
        assert_eq!(table.length().unwrap(), 1);
    }

    #[test]
    fn create_with_overwrite_recreates() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        table.ingest(batch(&[(1, "a")]), false, false).unwrap();
        table.create_table(true).unwrap();
        assert!(table.exists().unwrap());
        assert_eq!(table.length().unwrap(), 0);
    }

    #[test]
    fn drop_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        table.drop_table().unwrap();
        table.drop_table().unwrap();
        assert!(!table.exists().unwrap());
    }

    #[test]
    fn columns_introspect_live_table() {
        let tmp = TempDir::new().unwrap();
        let table = users(&tmp);
        assert_eq!(table.columns().unwrap(), vec!["id", "name"]);
        table.drop_table().unwrap();
        assert!(table.columns().is_err());
    }

    #[test]
    fn path_requires_file() {
        let tmp = TempDir::new().unwrap();
        let d = Descriptor::new("later", [("x", "TEXT")], Vec::<String>::new()).unwrap();
        let table = Table::new(d, tmp.path());
        assert!(matches!(table.path(), Err(Error::NotFound(_))));
        assert!(matches!(table.connect(), Err(Error::NotFound(_))));
        table.create_table(false).unwrap();
        assert_eq!(table.path().unwrap(), tmp.path().join("later.db"));
        assert!(table.connect().is_ok());
    }

    #[test]
    fn renamed_tables_use_their_own_file() {
        let tmp = TempDir::new().unwrap();
        let original = users(&tmp);
        let copy = Table::new(original.descriptor().renamed("users_v2").unwrap(), tmp.path());
        copy.create_table(false).unwrap();
        copy.ingest(batch(&[(9, "z")]), false, false).unwrap();
        assert_eq!(copy.path().unwrap(), tmp.path().join("users_v2.db"));
        assert_eq!(original.length().unwrap(), 0);
        assert_eq!(copy.length().unwrap(), 1);
    }
}
