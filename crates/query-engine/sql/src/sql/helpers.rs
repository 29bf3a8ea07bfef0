//! Helpers for shaping statements before they are sent to the database.

use super::string::SQL;

/// Alias of the subquery wrapped by [`rows_as_json_array`].
pub const ROWS_ALIAS: &str = "rows";

/// Wrap a statement so the database returns its whole result as a single JSON
/// array of row objects, in a single text column.
///
/// ```sql
/// SELECT coalesce(json_agg("rows"), '[]')::text FROM (
/// <statement>
/// ) AS "rows"
/// ```
///
/// Object keys keep the column order of the statement. The statement sits on its
/// own lines so a trailing line comment cannot swallow the closing parenthesis.
/// Only a single query is valid in that position, so anything that is not a
/// query is rejected by the database before it runs.
pub fn rows_as_json_array(statement: SQL) -> SQL {
    let mut sql = SQL::new();
    sql.append_syntax(&format!(
        "SELECT coalesce(json_agg(\"{ROWS_ALIAS}\"), '[]')::text FROM (\n"
    ));
    sql.append_syntax(&statement.sql);
    sql.append_syntax(&format!("\n) AS \"{ROWS_ALIAS}\""));
    sql.params = statement.params;
    sql
}
