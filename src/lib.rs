//! Declared-schema table management over SQLite.
//!
//! Each table lives in its own database file, `<dir>/<name>.db`, and is
//! described by a [`Descriptor`]: an ordered column -> type mapping, an
//! optional composite primary key, and a name. A [`Table`] binds a
//! descriptor to a storage directory and runs every operation through a
//! short-lived [`Scope`].
//!
//! ## Storage
//!
//! - [`Scope`]: A fresh connection and transaction per call
//! - [`Source`]: Catalog lookups and read queries
//! - [`Sink`]: DDL and row writes
//!
//! ## Tables
//!
//! - [`Descriptor`]: Validated table declaration
//! - [`Schema`]: Static declaration for concrete table types
//! - [`Table`]: Existence, create/drop, introspection, ingestion
//! - [`Frame`]: Ordered columns of [`Value`] rows, in and out
mod error;
mod store;
mod table;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::*;
pub use store::*;
pub use table::*;

// ============================================================================
// STORAGE PARAMETERS
// ============================================================================
/// File extension of every table's database file.
pub const EXTENSION: &str = "db";
/// Environment variable naming the default storage directory.
pub const DIR_VAR: &str = "FORGE_DIR";

// ============================================================================
// INGESTION PARAMETERS
// ============================================================================
/// Column injected into every ingested row when a load date is requested.
pub const LOAD_DATE: &str = "LOAD_DATE";
/// Format of the injected load date.
pub const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time rendered with [`TIMESTAMP`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP).to_string()
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "cli")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_matches_format() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), "2024-01-31 23:59:59".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP).is_ok());
    }
}
