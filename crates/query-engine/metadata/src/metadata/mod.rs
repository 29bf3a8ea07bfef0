//! Metadata information regarding the database and tracked information.

pub mod database;

// re-export without modules
pub use database::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub tables: TablesInfo,
}

impl Default for Metadata {
    fn default() -> Self {
        let transactions = transactions_table();
        Metadata {
            tables: TablesInfo(
                [(transactions.table_name.clone(), transactions)]
                    .into_iter()
                    .collect(),
            ),
        }
    }
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            tables: TablesInfo::empty(),
        }
    }

    /// The schema description embedded into translation prompts: one
    /// `CREATE TABLE` statement per tracked table.
    pub fn describe(&self) -> String {
        self.tables
            .0
            .values()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The `table.column` pairs that scope rows to a single user.
    pub fn owner_columns(&self) -> Vec<String> {
        self.tables
            .0
            .values()
            .filter_map(|table| {
                table
                    .owner_column
                    .as_ref()
                    .map(|column| format!("{}.{column}", table.table_name))
            })
            .collect()
    }
}
