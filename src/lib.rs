//! # Prefstore - Boolean Preference Data Access
//!
//! A thin, fail-fast access layer over a single two-column relational table
//! of (user id, item id) pairs, where the existence of a row IS the
//! preference — no rating value is stored.
//!
//! Prefstore provides:
//! - A query catalog rendered once from a table/column binding
//! - A fixed operation surface for recommender-style workloads (counts,
//!   existence checks, per-user and per-item lookups, co-occurrence counts)
//! - Streaming cursors that bound memory use over very large result sets
//! - Pluggable per-engine cursor policies (fetch-size hint, forward-only
//!   advance fallback)
//! - SQLite-backed connection provisioning with file and shared-memory modes

pub mod binding;
pub mod catalog;
pub mod config;
pub mod cursor;
pub mod provider;
pub mod schema;
pub mod store;

// Re-exports for convenient access
pub use binding::TableBinding;
pub use catalog::QueryCatalog;
pub use cursor::{CursorPolicy, FetchSize, RowCursor, SqliteCursorPolicy};
pub use provider::{ConnectionProvider, SqliteProvider};
pub use store::BooleanPrefStore;

/// User identifier. Opaque to this layer beyond equality and ordering.
pub type UserId = i64;

/// Item identifier. Opaque to this layer beyond equality and ordering.
pub type ItemId = i64;

/// Result type alias for prefstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for prefstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Table/column identifiers missing or malformed at construction.
    /// Raised before any query executes.
    #[error("Invalid store configuration: {0}")]
    Config(String),

    /// The connection provider could not supply a usable connection.
    /// Not retried here; retry policy belongs to the provider or caller.
    #[error("No database connection available: {0}")]
    ConnectionUnavailable(String),

    /// Query execution or row consumption failed.
    #[error("Store access error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
