pub mod manager;
pub mod models;
pub mod query_builder;
pub mod types;

pub use manager::{is_no_rows, is_unknown_column, DatabaseError, DatabaseManager};
pub use query_builder::{QueryBuilder, SqlParam, SqlResult, UpdateBuilder};
pub use types::{decimal_to_f64, DbInt};
