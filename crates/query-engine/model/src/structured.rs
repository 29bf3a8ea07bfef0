//! Typed model output: the JSON Schema of the target type is sent with the
//! request, and the answer is validated against it before it is deserialized.

use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{CompletionRequest, LanguageModel, ModelError};

/// The JSON Schema of `T`, as sent to the model.
pub fn output_schema<T: JsonSchema>() -> Result<Value, ModelError> {
    serde_json::to_value(schemars::schema_for!(T))
        .map_err(|error| ModelError::InvalidSchema(error.to_string()))
}

/// Ask `model` for an instance of `T`. Absent optional fields become `None`;
/// anything that does not match the schema is an error.
pub async fn complete_structured<T, M>(
    model: &M,
    system: String,
    user: String,
    schema_name: &str,
) -> Result<T, ModelError>
where
    T: DeserializeOwned + JsonSchema,
    M: LanguageModel + ?Sized,
{
    let schema = output_schema::<T>()?;
    let request = CompletionRequest {
        system,
        user,
        schema_name: schema_name.to_string(),
        schema: schema.clone(),
    };
    let answer = model.complete(request).await?;

    validate(schema_name, &schema, &answer)?;
    serde_json::from_value(answer).map_err(|error| ModelError::InvalidJson(error.to_string()))
}

fn validate(schema_name: &str, schema: &Value, answer: &Value) -> Result<(), ModelError> {
    let compiled =
        JSONSchema::compile(schema).map_err(|error| ModelError::InvalidSchema(error.to_string()))?;
    let result = compiled.validate(answer).map_err(|errors| {
        errors
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    });
    result.map_err(|message| ModelError::SchemaViolation {
        schema: schema_name.to_string(),
        message,
    })
}
