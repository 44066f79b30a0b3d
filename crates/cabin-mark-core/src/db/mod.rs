//! SQLite persistence: connection management, schema and data access.

pub mod connection;
pub mod inspection_dao;
pub mod photo_dao;
pub mod schema;

pub use connection::{Database, DatabaseStats};
pub use photo_dao::PhotoListRow;
