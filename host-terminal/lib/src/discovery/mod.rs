//! Terminal identification primitives
//!
//! - [`families`] - the table of known terminal families
//! - [`classify`] - synchronous guess from environment variables
//! - [`process_table`] - process-table queries (OS-backed or in-memory)
//! - [`probe`] - asynchronous walk up the process ancestry

pub mod classify;
pub mod families;
pub mod probe;
pub mod process_table;
