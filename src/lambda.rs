#[cfg(feature = "lambda")]
use lambda_edge_local::fixtures::Fixture;
#[cfg(feature = "lambda")]
use lambda_edge_local::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use lambda_edge_local::FixtureRuntimeConfig;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::Value;

#[cfg(feature = "lambda")]
async fn function_handler(fixture: Fixture, event: LambdaEvent<Value>) -> Result<Value, Error> {
    tracing::info!(
        "Invoking {:?} (request id {})",
        fixture,
        event.context.request_id
    );

    fixture.invoke(event.payload).await.map_err(|e| {
        tracing::error!("{:?} failed: {} ({})", fixture, e, e.error_type());
        Box::new(e) as Box<dyn std::error::Error + Send + Sync>
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 由 _HANDLER 決定要執行哪個 fixture
    let config = FixtureRuntimeConfig::from_env()?;
    config.validate()?;
    let fixture = config.fixture()?;
    tracing::info!("Serving fixture {}", config.handler);

    run(service_fn(move |event| function_handler(fixture, event))).await
}
