//! SQL string representation and placeholder normalization.

pub mod helpers;
pub mod placeholders;
pub mod string;
