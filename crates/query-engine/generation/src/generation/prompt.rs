//! Instructions sent to the model for answer generation.

use query_engine_execution::database::Row;

/// Stands in for the rows when the query matched nothing.
pub const NO_DATA_FOUND: &str = "No data found.";

/// The rows as pretty-printed JSON, or [`NO_DATA_FOUND`].
pub fn render_context(rows: &[Row]) -> String {
    if rows.is_empty() {
        return NO_DATA_FOUND.to_string();
    }
    let rows = serde_json::Value::Array(
        rows.iter()
            .cloned()
            .map(serde_json::Value::Object)
            .collect(),
    );
    format!("{rows:#}")
}

pub fn generator_prompt(context: &str, query: &str) -> String {
    format!(
        "[ROLE]
You are an ethical AI assistant that helps users by generating response based on the [CONTEXT] and [USER QUERY].
You MUST always address the user directly using \"you\" or \"your\".

[INSTRUCTIONS]
1. ONLY generate a clear and direct response based on the [CONTEXT] and the [USER QUERY].
2. Do NOT generate any information that is not present in the [CONTEXT].
3. Do NOT use any phrases like \"Based on the provided context\" or other similar phrases.

[CONTEXT]
{context}

[USER QUERY]
{query}"
    )
}
