//! SQL strings, their bound parameters, and the rewrites applied before execution.

pub mod sql;
