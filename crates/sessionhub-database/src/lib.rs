//! # sessionhub-database
//!
//! PostgreSQL connection management and concrete repositories for the
//! durable token table and the user accounts behind credential checks.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
