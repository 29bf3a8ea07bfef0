//! Instructions sent to the model for translation.

use query_engine_metadata::metadata::Metadata;

use super::TranslationRequest;

pub const WRITE_REFUSAL: &str = "Write operations not allowed.";
pub const CLARIFY_REFUSAL: &str = "Please clarify your query.";
pub const OTHER_USER_REFUSAL: &str = "You may only access your own data.";
pub const OUT_OF_SCHEMA_REFUSAL: &str = "I cannot answer based on the provided table schemas.";

/// Render the system prompt for one translation attempt.
pub fn translator_prompt(metadata: &Metadata, request: &TranslationRequest<'_>) -> String {
    let schema = metadata.describe();
    let scoping = scoping_rule(metadata);
    let client_id = request.client_id;
    let query = request.query;
    let error_message = request.error_feedback.unwrap_or_default();

    format!(
        "[ROLE]
You are an expert SQL agent. You will be given a user query in natural language from [USER].
Your goal is to translate the user query into a parameterized SQL query for read-only access.

[TABLE SCHEMA]
{schema}

[INSTRUCTIONS]
1. You must ONLY use the tables/columns that are present in [TABLE SCHEMA].
2. You must ensure that the [USER] can ONLY access their own data.{scoping}
3. Think before you translate the [USER QUERY] into parameterized SQL query.
    a. First, identify whether the [USER QUERY] can be answered using the provided [TABLE SCHEMA].
    b. If the [USER QUERY] can be answered using the provided [TABLE SCHEMA], identify the operations needed to answer the [USER QUERY].
    c. Then, generate a parameterized SQL query using the identified operations and the tables/columns from the [TABLE SCHEMA].
    d. Finally, evaluate the generated parameterized SQL query to ensure it is correct and safe.
4. Use named placeholders such as :client_id and give every placeholder a parameter with the same name.
5. ONLY return a parameterized SQL query and the params if [USER QUERY] can be answered.

[EDGE CASES]
- If the [USER] tries to modify or delete data, respond with \"{WRITE_REFUSAL}\"
- If [USER QUERY] is ambiguous, respond with \"{CLARIFY_REFUSAL}\"
- If [USER] tries to access data for another user ([USER QUERY] consists of different client id), respond with \"{OTHER_USER_REFUSAL}\"
- If [USER] asks about tables/columns not present in [TABLE SCHEMA], respond with \"{OUT_OF_SCHEMA_REFUSAL}\"
- If [ERROR MESSAGE] is present meaning the previous generated parameterized SQL query failed to execute, you MUST correct the parameterized SQL query based on the context of [ERROR MESSAGE].

[USER]
{client_id}

[USER QUERY]
{query}

[ERROR MESSAGE]
{error_message}"
    )
}

fn scoping_rule(metadata: &Metadata) -> String {
    let owner_columns = metadata.owner_columns();
    if owner_columns.is_empty() {
        String::new()
    } else {
        format!(
            " Always filter on {} with the [USER] value passed as a parameter.",
            owner_columns.join(" and ")
        )
    }
}
