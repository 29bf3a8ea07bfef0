//! Metadata information regarding the database and tracked information.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types a tracked column may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    #[serde(rename = "double precision")]
    DoublePrecision,
    Numeric,
    Character,
    #[serde(rename = "character varying")]
    CharacterVarying,
    Text,
    Jsonb,
    Date,
    #[serde(rename = "timestamp with time zone")]
    TimestampWithTimeZone,
    #[serde(rename = "timestamp without time zone", alias = "timestamp")]
    TimestampWithoutTimeZone,
    Uuid,
}

impl ScalarType {
    /// The keyword used for this type in a `CREATE TABLE` statement.
    pub fn sql_keyword(self) -> &'static str {
        match self {
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Smallint => "SMALLINT",
            ScalarType::Integer => "INTEGER",
            ScalarType::Bigint => "BIGINT",
            ScalarType::Real => "REAL",
            ScalarType::DoublePrecision => "DOUBLE PRECISION",
            ScalarType::Numeric => "NUMERIC",
            ScalarType::Character => "CHAR",
            ScalarType::CharacterVarying => "VARCHAR",
            ScalarType::Text => "TEXT",
            ScalarType::Jsonb => "JSONB",
            ScalarType::Date => "DATE",
            ScalarType::TimestampWithTimeZone => "TIMESTAMPTZ",
            ScalarType::TimestampWithoutTimeZone => "TIMESTAMP",
            ScalarType::Uuid => "UUID",
        }
    }
}

/// Mapping from a "table" name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TablesInfo(pub BTreeMap<String, TableInfo>);

impl TablesInfo {
    pub fn empty() -> Self {
        TablesInfo(BTreeMap::new())
    }
}

/// Information about a database table (or any other kind of relation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub table_name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,
    /// The column holding the identifier of the user who owns a row.
    /// Queries must always filter on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_column: Option<String>,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: ScalarType,
    /// Type modifiers such as the `14, 2` of `NUMERIC(14,2)` or the `100` of `VARCHAR(100)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_modifiers: Vec<u32>,
}

impl ColumnInfo {
    pub fn new(name: &str, r#type: ScalarType) -> Self {
        ColumnInfo {
            name: name.to_string(),
            r#type,
            type_modifiers: vec![],
        }
    }

    pub fn with_modifiers(mut self, modifiers: &[u32]) -> Self {
        self.type_modifiers = modifiers.to_vec();
        self
    }
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.r#type.sql_keyword())?;
        if !self.type_modifiers.is_empty() {
            let modifiers = self
                .type_modifiers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "({modifiers})")?;
        }
        Ok(())
    }
}

/// Renders the table as a `CREATE TABLE` statement.
impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CREATE TABLE {} (", self.table_name)?;
        let last = self.columns.len().saturating_sub(1);
        for (index, column) in self.columns.iter().enumerate() {
            let separator = if index == last { "" } else { "," };
            writeln!(f, "    {column}{separator}")?;
        }
        write!(f, ");")
    }
}

/// The transactions table every deployment starts with.
pub fn transactions_table() -> TableInfo {
    TableInfo {
        table_name: "transactions".to_string(),
        columns: vec![
            ColumnInfo::new("clnt_id", ScalarType::Integer),
            ColumnInfo::new("bank_id", ScalarType::Integer),
            ColumnInfo::new("acc_id", ScalarType::Integer),
            ColumnInfo::new("txn_id", ScalarType::Text),
            ColumnInfo::new("txn_date", ScalarType::TimestampWithoutTimeZone),
            ColumnInfo::new("description", ScalarType::Text),
            ColumnInfo::new("amt", ScalarType::Numeric).with_modifiers(&[14, 2]),
            ColumnInfo::new("cat", ScalarType::CharacterVarying).with_modifiers(&[100]),
            ColumnInfo::new("merchant", ScalarType::CharacterVarying).with_modifiers(&[255]),
        ],
        owner_column: Some("clnt_id".to_string()),
    }
}
