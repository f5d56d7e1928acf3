use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Report whether the table exists")]
    Exists,
    #[command(about = "Create the table from its declaration", alias = "mk")]
    Create {
        #[arg(long, help = "Drop and recreate an existing table")]
        overwrite: bool,
    },
    #[command(about = "Drop the table if it exists", alias = "rm")]
    Drop,
    #[command(about = "List the live table's columns in storage order", alias = "cols")]
    Columns,
    #[command(about = "Run a query and print its rows", alias = "q")]
    Query {
        #[arg(required = true)]
        sql: String,
        #[arg(long, help = "Print rows as JSON objects")]
        json: bool,
    },
    #[command(about = "Count the table's rows", alias = "len")]
    Length,
    #[command(about = "Ingest a JSON array of row objects", alias = "load")]
    Ingest {
        #[arg(required = true)]
        rows: PathBuf,
        #[arg(long, help = "Stamp every row's LOAD_DATE with the current time")]
        load_date: bool,
        #[arg(long, help = "Update rows whose primary key already exists")]
        overwrite: bool,
    },
    #[command(about = "Print the database file path")]
    Path,
}
