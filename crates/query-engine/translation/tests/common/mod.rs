use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use ledger_agent_configuration::environment::FixedEnvironment;
use query_engine_model::CompletionRequest;
use query_engine_translation::translation::{
    ModelTranslator, TranslationRequest, TranslationResult, Translator,
};
use tests_common::ScriptedModel;

/// A question, the feedback of a previous attempt, and what the model answers.
#[derive(Deserialize)]
struct Request {
    client_id: String,
    query: String,
    #[serde(default)]
    error_feedback: Option<String>,
    answer: serde_json::Value,
}

/// Translate the request found in `tests/goldenfiles/<testname>` with the
/// configuration next to it, returning the result and what was sent to the model.
pub async fn test_translation(
    testname: &str,
) -> anyhow::Result<(TranslationResult, CompletionRequest)> {
    tests_common::init_logging();
    let directory = PathBuf::from("tests/goldenfiles").join(testname);

    let parsed_configuration = ledger_agent_configuration::parse_configuration(&directory).await?;
    let configuration = ledger_agent_configuration::make_runtime_configuration(
        parsed_configuration,
        FixedEnvironment::from([
            (
                "CONNECTION_URI".into(),
                "the translation tests do not rely on a database connection".into(),
            ),
            (
                "AZURE_OPENAI_ENDPOINT".into(),
                "the translation tests do not rely on a model endpoint".into(),
            ),
            (
                "AZURE_OPENAI_DEPLOYMENT".into(),
                "the translation tests do not rely on a model endpoint".into(),
            ),
            (
                "AZURE_OPENAI_API_KEY".into(),
                "the translation tests do not rely on a model endpoint".into(),
            ),
        ]),
    )?;

    let request: Request =
        serde_json::from_str(&fs::read_to_string(directory.join("request.json"))?)?;

    let model = std::sync::Arc::new(ScriptedModel::answering([request.answer]));
    let translator = ModelTranslator::new(model.clone(), configuration.metadata);
    let result = translator
        .translate(TranslationRequest {
            client_id: &request.client_id,
            query: &request.query,
            error_feedback: request.error_feedback.as_deref(),
        })
        .await?;

    let sent = model
        .requests()
        .pop()
        .ok_or_else(|| anyhow::anyhow!("the model was not called"))?;
    Ok((result, sent))
}
