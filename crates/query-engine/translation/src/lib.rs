//! Translate a natural-language question into a parameterized SQL template.

pub mod translation;
