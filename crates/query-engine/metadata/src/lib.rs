//! Metadata describing the tables the agent is allowed to query.

pub mod metadata;
