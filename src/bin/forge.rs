//! Command-line table management.
//!
//! Create, drop, inspect, query, and ingest into one declared SQLite table:
//!
//! ```text
//! forge --table users.json create
//! forge --table users.json ingest rows.json --load-date --overwrite
//! forge --table users.json query "SELECT * FROM users"
//! ```
use clap::Parser;
use sqlforge::*;

fn main() -> anyhow::Result<()> {
    log();
    cli::CLI::parse().run()
}
