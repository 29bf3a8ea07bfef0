//! The state machine driven by scripted stages.

use std::sync::Arc;

use similar_asserts::assert_eq;

use query_engine_execution::metrics::Metrics;
use query_engine_execution::query::{ExecutionOutcome, FailureKind, NO_QUERY_MESSAGE};
use query_engine_orchestration::{Orchestrator, QueryContext, Stage};
use query_engine_sql::sql::string::Param;
use query_engine_translation::translation::TranslationResult;
use tests_common::{row, ScriptedExecutor, ScriptedGenerator, ScriptedTranslator};

type Stages = (
    Arc<ScriptedTranslator>,
    Arc<ScriptedExecutor>,
    Arc<ScriptedGenerator>,
);

fn orchestrator(
    (translator, executor, generator): &Stages,
) -> Orchestrator<Arc<ScriptedTranslator>, Arc<ScriptedExecutor>, Arc<ScriptedGenerator>> {
    Orchestrator::new(
        translator.clone(),
        executor.clone(),
        generator.clone(),
        Metrics::unregistered().unwrap(),
    )
}

fn context() -> QueryContext {
    QueryContext::new("42", "How much did I spend on groceries?")
}

fn groceries() -> TranslationResult {
    TranslationResult::query(
        "SELECT sum(amt) AS total FROM transactions WHERE clnt_id = :client_id AND cat = :cat",
        vec![Param::new("client_id", "42"), Param::new("cat", "groceries")],
    )
}

fn failure(attempt: usize) -> ExecutionOutcome {
    ExecutionOutcome::execution_error(
        "SELECT total FROM transactions",
        &[],
        format!("column \"total\" does not exist (attempt {attempt})"),
    )
}

#[tokio::test]
async fn rows_go_straight_to_the_generator() {
    tests_common::init_logging();
    let rows = ExecutionOutcome::Rows(vec![row(serde_json::json!({ "total": "182.40" }))]);
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([groceries()])),
        Arc::new(ScriptedExecutor::new([rows.clone()])),
        Arc::new(ScriptedGenerator::new("You spent $182.40 on groceries.")),
    );

    let response = orchestrator(&stages).run(&context()).await.unwrap();

    assert_eq!(response.response, "You spent $182.40 on groceries.");
    assert_eq!(stages.0.feedback(), vec![None]);
    assert_eq!(stages.1.calls(), 1);
    assert_eq!(stages.2.outcomes(), vec![rows]);
}

#[tokio::test]
async fn a_failed_execution_is_fed_back_to_the_translator() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([groceries(), groceries()])),
        Arc::new(ScriptedExecutor::new([
            failure(1),
            ExecutionOutcome::Rows(vec![]),
        ])),
        Arc::new(ScriptedGenerator::new("You have no grocery spending.")),
    );

    orchestrator(&stages).run(&context()).await.unwrap();

    assert_eq!(
        stages.0.feedback(),
        vec![None, failure(1).error_message().map(str::to_string)]
    );
    assert_eq!(stages.1.calls(), 2);
    assert_eq!(stages.2.outcomes(), vec![ExecutionOutcome::Rows(vec![])]);
}

#[tokio::test]
async fn retries_stop_at_the_ceiling() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::always(groceries())),
        Arc::new(ScriptedExecutor::new([failure(1), failure(2), failure(3), failure(4)])),
        Arc::new(ScriptedGenerator::new("unused")),
    );

    orchestrator(&stages).run(&context()).await.unwrap();

    assert_eq!(stages.0.calls(), 3);
    assert_eq!(stages.1.calls(), 3);
    assert_eq!(stages.2.outcomes(), vec![failure(3)]);
}

#[tokio::test]
async fn the_ceiling_is_configurable() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::always(groceries())),
        Arc::new(ScriptedExecutor::always(failure(0))),
        Arc::new(ScriptedGenerator::new("unused")),
    );

    orchestrator(&stages)
        .with_max_execution_retries(1)
        .run(&context())
        .await
        .unwrap();

    assert_eq!(stages.0.calls(), 1);
    assert_eq!(stages.1.calls(), 1);
}

#[tokio::test]
async fn translator_and_executor_calls_are_bounded() {
    for ceiling in 0..6 {
        let stages: Stages = (
            Arc::new(ScriptedTranslator::always(groceries())),
            Arc::new(ScriptedExecutor::always(failure(0))),
            Arc::new(ScriptedGenerator::new("unused")),
        );

        orchestrator(&stages)
            .with_max_execution_retries(ceiling)
            .run(&context())
            .await
            .unwrap();

        let expected = usize::try_from(ceiling.max(1)).unwrap();
        assert_eq!(stages.0.calls(), expected, "ceiling {ceiling}");
        assert_eq!(stages.1.calls(), expected, "ceiling {ceiling}");
        assert_eq!(stages.2.calls(), 1, "ceiling {ceiling}");
    }
}

#[tokio::test]
async fn a_refusal_is_routed_through_the_executor_without_retry() {
    let refusal = TranslationResult::refusal("Write operations not allowed.");
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([refusal])),
        Arc::new(ScriptedExecutor::new([ExecutionOutcome::no_query(Some(
            "Write operations not allowed.",
        ))])),
        Arc::new(ScriptedGenerator::new("Write operations not allowed.")),
    );

    orchestrator(&stages).run(&context()).await.unwrap();

    assert_eq!(stages.0.calls(), 1);
    assert_eq!(stages.1.templates(), vec![None]);
    assert_eq!(
        stages.2.outcomes(),
        vec![ExecutionOutcome::Failure {
            kind: FailureKind::NoQuery,
            message: "Write operations not allowed.".to_string()
        }]
    );
}

#[tokio::test]
async fn an_empty_translation_reaches_the_generator_with_the_default_message() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([TranslationResult::default()])),
        Arc::new(ScriptedExecutor::new([ExecutionOutcome::no_query(None)])),
        Arc::new(ScriptedGenerator::new(NO_QUERY_MESSAGE)),
    );

    let response = orchestrator(&stages).run(&context()).await.unwrap();

    assert_eq!(response.response, NO_QUERY_MESSAGE);
    assert_eq!(stages.0.calls(), 1);
}

#[tokio::test]
async fn translator_failure_is_fatal() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([])),
        Arc::new(ScriptedExecutor::new([])),
        Arc::new(ScriptedGenerator::new("unused")),
    );

    let error = orchestrator(&stages).run(&context()).await.unwrap_err();

    assert_eq!(error.stage, Stage::Translator);
    assert_eq!(
        error.to_string(),
        "Error in sql_translator: request to the language model failed: translator script exhausted"
    );
    assert_eq!(stages.1.calls(), 0);
    assert_eq!(stages.2.calls(), 0);
}

#[tokio::test]
async fn executor_failure_is_fatal_and_not_retried() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::always(groceries())),
        Arc::new(ScriptedExecutor::new([])),
        Arc::new(ScriptedGenerator::new("unused")),
    );

    let error = orchestrator(&stages).run(&context()).await.unwrap_err();

    assert_eq!(error.stage, Stage::Executor);
    assert_eq!(
        error.to_string(),
        "Error in sql_executor: database connection failed: executor script exhausted"
    );
    assert_eq!(stages.0.calls(), 1);
    assert_eq!(stages.2.calls(), 0);
}

#[tokio::test]
async fn generator_failure_is_fatal() {
    let stages: Stages = (
        Arc::new(ScriptedTranslator::new([groceries()])),
        Arc::new(ScriptedExecutor::new([ExecutionOutcome::Rows(vec![])])),
        Arc::new(ScriptedGenerator::failing()),
    );

    let error = orchestrator(&stages).run(&context()).await.unwrap_err();

    assert_eq!(error.stage, Stage::Generator);
    assert!(error.to_string().starts_with("Error in generator: "));
}

#[tokio::test]
async fn metrics_follow_the_run() {
    let mut registry = prometheus::Registry::new();
    let metrics = Metrics::initialize(&mut registry).unwrap();
    let orchestrator = Orchestrator::new(
        ScriptedTranslator::always(groceries()),
        ScriptedExecutor::new([failure(1), ExecutionOutcome::Rows(vec![])]),
        ScriptedGenerator::new("done"),
        metrics.clone(),
    );

    orchestrator.run(&context()).await.unwrap();

    assert_eq!(metrics.query_total.get(), 1);
    assert_eq!(metrics.execution_failure_total.get(), 1);
    assert_eq!(metrics.translation_retry_total.get(), 1);
    assert_eq!(metrics.refusal_total.get(), 0);
    assert_eq!(metrics.fatal_error_total.get(), 0);
}
