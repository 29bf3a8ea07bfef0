//! Query execution against a PostgreSQL database.

pub mod database;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod query;
