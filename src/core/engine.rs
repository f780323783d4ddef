use crate::adapters::WebflowClient;
use crate::config::{AppConfig, HttpPolicy};
use crate::core::pipeline::MenuPdfPipeline;
use crate::core::transport::{FunctionResponse, PdfPayload};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub struct MenuEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> MenuEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<PdfPayload> {
        tracing::info!("Starting weekly menu generation...");

        let data = self.pipeline.extract().await?;

        tracing::info!("Rendering document...");
        let document = self.pipeline.transform(data).await?;
        tracing::info!("Rendered {} page(s)", document.page_count());

        let payload = self.pipeline.load(document).await?;
        tracing::info!("✅ PDF ready: {} bytes", payload.bytes.len());

        Ok(payload)
    }
}

/// 驗證設定、連接 Webflow 並產生 PDF
pub async fn generate(config: &AppConfig) -> Result<PdfPayload> {
    config.validate()?;
    let client = WebflowClient::new(&config.cms)?;
    let engine = MenuEngine::new(MenuPdfPipeline::new(client, config.clone()));
    engine.run().await
}

/// 缺少方法（直接呼叫）視同 GET
pub fn method_allowed(policy: &HttpPolicy, method: Option<&str>) -> bool {
    !policy.require_get || method.map_or(true, |m| m.eq_ignore_ascii_case("GET"))
}

/// 函式入口：檢查方法後產生 PDF，所有錯誤都轉成 JSON 回應
pub async fn handle_request(method: Option<&str>, config: &AppConfig) -> FunctionResponse {
    if !method_allowed(&config.http, method) {
        tracing::warn!("🚫 Rejected method {:?}", method);
        return FunctionResponse::method_not_allowed();
    }

    match generate(config).await {
        Ok(payload) => FunctionResponse::pdf(&payload, &config.document.filename),
        Err(e) => {
            tracing::error!(category = e.category(), "❌ Menu generation failed: {}", e);
            FunctionResponse::error(&e)
        }
    }
}
