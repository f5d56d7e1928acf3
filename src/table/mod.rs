//! Declared tables and the batches that flow through them.
//!
//! A [`Descriptor`] (or a type implementing [`Schema`]) says what a table
//! looks like; a [`Table`] binds it to a directory and does the work.
mod descriptor;
mod frame;
mod schema;
mod table;
mod value;

pub use descriptor::*;
pub use frame::*;
pub use schema::*;
pub use table::*;
pub use value::*;
