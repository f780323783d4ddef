use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use weekly_menu_pdf::config::lambda::LambdaConfig;
use weekly_menu_pdf::config::AppConfig;
use weekly_menu_pdf::core::transport::{FunctionEvent, FunctionResponse};
use weekly_menu_pdf::utils::error::Result;
use weekly_menu_pdf::utils::logger;
use weekly_menu_pdf::handle_request;

async fn function_handler(
    event: LambdaEvent<FunctionEvent>,
    config: &Result<AppConfig>,
) -> std::result::Result<FunctionResponse, Error> {
    tracing::info!(
        request_id = %event.context.request_id,
        "Starting weekly menu function"
    );

    let response = match config {
        Ok(config) => handle_request(event.payload.method(), config).await,
        Err(e) => {
            tracing::error!(category = e.category(), "❌ Invalid function configuration: {}", e);
            FunctionResponse::error(e)
        }
    };

    tracing::info!("Weekly menu function finished with status {}", response.status_code);
    Ok(response)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Error> {
    logger::init_lambda_logger();

    // 冷啟動時讀取一次，之後每個請求共用
    let config = LambdaConfig::from_env().map(LambdaConfig::into_app_config);
    let config = &config;

    run(service_fn(move |event: LambdaEvent<FunctionEvent>| async move {
        function_handler(event, config).await
    }))
    .await
}
