//! Type definitions of a low-level SQL string representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A SQL statement using the backend's native `$n` placeholders, together
/// with the values bound to them. `params[i]` is bound to `$(i + 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<Param>,
}

/// A named parameter value. Values always travel as text; the backend infers
/// their types from the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

impl Param {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value)
    }
}

impl SQL {
    pub fn new() -> SQL {
        SQL::default()
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Bind a new parameter and write its placeholder. Returns the placeholder index.
    pub fn append_param(&mut self, param: Param) -> usize {
        self.params.push(param);
        let index = self.params.len();
        self.append_placeholder(index);
        index
    }

    /// Write a placeholder for a parameter that is already bound.
    pub fn append_placeholder(&mut self, index: usize) {
        self.sql.push('$');
        self.sql.push_str(&index.to_string());
    }

    /// The bound values in placeholder order.
    pub fn values(&self) -> Vec<&str> {
        self.params.iter().map(|param| param.value.as_str()).collect()
    }
}

/// Render a parameter list the way it appears in diagnostics fed back to the model.
pub fn display_params(params: &[Param]) -> String {
    let rendered = params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{rendered}]")
}
