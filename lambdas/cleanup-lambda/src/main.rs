use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use lar_shared::cleanup::{run_cleanup, CleanupReport};
use lar_shared::AppState;
use std::env;
use std::sync::Arc;

/// Scheduled sweep of expired evidence photos. The EventBridge payload
/// carries nothing we need; every run works from the current clock.
async fn function_handler(
    state: Arc<AppState>,
    _event: LambdaEvent<serde_json::Value>,
) -> Result<CleanupReport, Error> {
    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "lar".to_string());
    let bucket_name = env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME must be set");

    let report = run_cleanup(
        &state.dynamo_client,
        &state.s3_client,
        &table_name,
        &bucket_name,
    )
    .await
    .map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(report)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let state = Arc::new(AppState::from_env().await);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { function_handler(state, event).await }
    }))
    .await
}
