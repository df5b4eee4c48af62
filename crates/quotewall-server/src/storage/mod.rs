//! Storage layer
//!
//! Uses SQLite (embedded, no external dependencies), accessed through sqlx.

pub mod db;

pub use db::Database;
