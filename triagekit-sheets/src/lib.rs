//! Table stores for triagekit.
//!
//! - [`SheetsTableStore`] reads and overwrites one tab of a Google
//!   spreadsheet through the Sheets v4 values API.
//! - [`MemoryTableStore`] keeps tables in process, for tests and dry runs.
//!
//! Environment variables commonly used:
//! - `SHEETS_ACCESS_TOKEN` (OAuth bearer token with spreadsheet scope)
//! - `SHEETS_BASE_URL` (optional)

pub mod client;
mod config;
mod error;
mod memory;
mod store;

pub use config::SheetsStoreBuilder;
pub use error::SheetsError;
pub use memory::MemoryTableStore;
pub use store::SheetsTableStore;
