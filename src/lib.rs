//! # SchoolDiary Backend
//!
//! A small CRUD REST API for a school record-keeping domain: students,
//! teachers, subjects, and grades. The crate exposes an axum-based HTTP
//! server over a repository abstraction with two interchangeable backends:
//! an embedded SQLite database (Diesel + r2d2) and an in-memory store for
//! tests and local development.
//!
//! ## Architecture
//!
//! - [`db`]: domain models, the `SchoolRepository` trait, error types, and
//!   the repository implementations plus configuration/factory wiring
//! - [`http`]: DTOs and entity→DTO projections, request handlers, router,
//!   and HTTP error mapping
//!
//! Every API operation is a direct translation of an HTTP verb into one or
//! two repository calls: look up, project, mutate, respond. There is no
//! cross-request shared mutable state beyond the backing store itself.

pub mod db;
pub mod http;
