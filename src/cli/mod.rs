//! Command-line front end over [`Table`](crate::Table).
mod cli;
mod command;

pub use cli::*;
pub use command::*;
