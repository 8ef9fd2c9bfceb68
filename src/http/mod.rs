//! HTTP server module for the school diary backend.
//!
//! An axum-based REST API over the repository layer:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP layer (axum handlers)                   │
//! │  - request parsing, JSON (de)serialization    │
//! │  - reference resolution, error mapping        │
//! │  - CORS, request tracing                      │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  Repository layer (db/)                       │
//! │  - LocalRepository / SqliteRepository         │
//! └──────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
