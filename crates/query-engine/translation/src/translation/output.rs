//! What the model answers with, and what translation hands to execution.

use schemars::JsonSchema;
use serde::Deserialize;

use query_engine_sql::sql::string::Param;

/// Structured output requested from the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct TranslatorOutput {
    /// Parameterized SQL query with placeholders.
    pub sql_query: Option<String>,
    /// List of parameters to bind to the query.
    pub params: Option<Vec<TranslatorParam>>,
    /// Message to the user if the query cannot be answered.
    pub error_message: Option<String>,
}

/// Param schema for binding in parameterized SQL query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct TranslatorParam {
    /// Parameter name to bind in SQL query
    pub name: String,
    /// Parameter value as string
    pub value: String,
}

/// The result of one translation attempt.
///
/// A refusal has no template and carries the message shown to the user. Neither a
/// template nor a message means the model produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    pub sql_template: Option<String>,
    pub params: Option<Vec<Param>>,
    pub error_message: Option<String>,
}

impl TranslationResult {
    pub fn query(sql_template: impl Into<String>, params: Vec<Param>) -> Self {
        TranslationResult {
            sql_template: Some(sql_template.into()),
            params: Some(params).filter(|params| !params.is_empty()),
            error_message: None,
        }
    }

    pub fn refusal(message: impl Into<String>) -> Self {
        TranslationResult {
            sql_template: None,
            params: None,
            error_message: Some(message.into()),
        }
    }

    pub fn is_refusal(&self) -> bool {
        self.sql_template.is_none() && self.error_message.is_some()
    }
}

/// Empty strings and empty lists count as absent.
impl From<TranslatorOutput> for TranslationResult {
    fn from(output: TranslatorOutput) -> Self {
        TranslationResult {
            sql_template: output.sql_query.filter(|sql| !sql.trim().is_empty()),
            params: output
                .params
                .filter(|params| !params.is_empty())
                .map(|params| {
                    params
                        .into_iter()
                        .map(|TranslatorParam { name, value }| Param { name, value })
                        .collect()
                }),
            error_message: output
                .error_message
                .filter(|message| !message.trim().is_empty()),
        }
    }
}
