use super::*;
use crate::*;
use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::path::PathBuf;

/// Manage one declared table from the command line.
///
/// The table is declared in a JSON file (see [`Declaration`]) and stored
/// under `--dir`, which defaults to `$FORGE_DIR` or the working directory.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CLI {
    #[arg(long, env = DIR_VAR, default_value = ".", help = "Storage directory")]
    dir: PathBuf,
    #[arg(long, short, required = true, help = "Table declaration (JSON)")]
    table: PathBuf,
    #[arg(long, help = "Store the declared table under another name")]
    name: Option<String>,
    #[command(subcommand)]
    command: Command,
}

impl CLI {
    pub fn run(self) -> anyhow::Result<()> {
        let table = self.open()?;
        match self.command {
            Command::Exists => println!("{}", table.exists()?),
            Command::Create { overwrite } => table.create_table(overwrite)?,
            Command::Drop => table.drop_table()?,
            Command::Columns => println!("{}", table.columns()?.join("\n")),
            Command::Length => println!("{}", table.length()?),
            Command::Path => println!("{}", table.path()?.display()),
            Command::Query { ref sql, json } => match (table.query(sql)?, json) {
                (frame, true) => println!("{}", serde_json::to_string_pretty(&frame.records())?),
                (frame, false) => println!("{}", frame),
            },
            Command::Ingest {
                ref rows,
                load_date,
                overwrite,
            } => println!(
                "{}",
                table.ingest(Self::rows(rows)?, load_date, overwrite)?
            ),
        }
        Ok(())
    }

    fn open(&self) -> anyhow::Result<Table> {
        let ref text = std::fs::read_to_string(&self.table)
            .with_context(|| format!("reading declaration {}", self.table.display()))?;
        let descriptor = serde_json::from_str::<Descriptor>(text)
            .with_context(|| format!("parsing declaration {}", self.table.display()))?;
        let descriptor = match self.name {
            Some(ref name) => descriptor.renamed(name.as_str())?,
            None => descriptor,
        };
        Ok(Table::new(descriptor, &self.dir))
    }

    /// Reads a JSON array of objects into a batch.
    fn rows(path: &Path) -> anyhow::Result<Frame> {
        let ref text = std::fs::read_to_string(path)
            .with_context(|| format!("reading rows {}", path.display()))?;
        let records = serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>(text)
            .with_context(|| format!("parsing rows {}", path.display()))?;
        Ok(Frame::from_records(records.into_iter().map(|record| {
            record.into_iter().map(|(k, v)| (k, Value::from(v)))
        })))
    }
}
