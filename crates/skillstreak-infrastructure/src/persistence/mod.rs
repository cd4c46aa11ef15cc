pub mod repositories;
pub mod transaction;

mod database;
mod error_mapper;

pub use database::Database;
pub use error_mapper::{is_busy, RepositoryErrorMapper, ResultExt};
pub use transaction::{SqliteTransactionContext, SqliteUnitOfWork};
