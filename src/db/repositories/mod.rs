//! Repository implementations module.
//!
//! This module contains the implementations of the `SchoolRepository` trait:
//! - `sqlite`: embedded SQLite database with Diesel ORM
//! - `local`: in-memory implementation for unit testing and local development

pub mod local;
pub mod sqlite;

pub use local::LocalRepository;
pub use sqlite::SqliteRepository;
