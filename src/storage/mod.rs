//! Storage layer for analyses and page scores
//!
//! The pipeline persists through the `Datastore` trait; `SqliteStorage`
//! is the shipped implementation.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::{SqliteStorage, RANKINGS_PAGE_SIZE};
pub use traits::{Datastore, StorageError, StorageResult};
