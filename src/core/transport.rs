use crate::layout::RenderedDocument;
use crate::utils::error::{MenuPdfError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationStrategy {
    /// 內容串流以 Flate 壓縮
    CompressedStreams,
    PlainStreams,
}

impl SerializationStrategy {
    pub const DEFAULT_ORDER: [SerializationStrategy; 2] = [
        SerializationStrategy::CompressedStreams,
        SerializationStrategy::PlainStreams,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SerializationStrategy::CompressedStreams => "compressed",
            SerializationStrategy::PlainStreams => "plain",
        }
    }

    pub fn serialize(self, document: &RenderedDocument) -> Result<Vec<u8>> {
        let mut pdf = document.to_pdf()?;
        if self == SerializationStrategy::CompressedStreams {
            pdf.compress();
        }

        let mut bytes = Vec::new();
        pdf.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// 序列化完成的 PDF 與其 base64 表示
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPayload {
    pub bytes: Vec<u8>,
    pub encoded: String,
    pub strategy: SerializationStrategy,
}

/// 依序嘗試每種策略，採用第一個非空的結果
pub fn encode_with_fallback(
    document: &RenderedDocument,
    strategies: &[SerializationStrategy],
) -> Result<PdfPayload> {
    encode_first_usable(strategies, |strategy| strategy.serialize(document))
}

/// `encode_with_fallback` 的核心，序列化動作由呼叫端提供
pub fn encode_first_usable<F>(
    strategies: &[SerializationStrategy],
    mut serialize: F,
) -> Result<PdfPayload>
where
    F: FnMut(SerializationStrategy) -> Result<Vec<u8>>,
{
    for &strategy in strategies {
        match serialize(strategy) {
            Ok(bytes) if !bytes.is_empty() => {
                let encoded = STANDARD.encode(&bytes);
                tracing::info!(
                    "📦 Serialized PDF with '{}' strategy: {} bytes, {} base64 chars",
                    strategy.name(),
                    bytes.len(),
                    encoded.len()
                );
                return Ok(PdfPayload {
                    bytes,
                    encoded,
                    strategy,
                });
            }
            Ok(_) => {
                tracing::warn!("⚠️ '{}' strategy produced no output", strategy.name());
            }
            Err(e) => {
                tracing::warn!("⚠️ '{}' strategy failed: {}", strategy.name(), e);
            }
        }
    }

    Err(MenuPdfError::Serialization {
        attempted: strategies
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// API Gateway / Netlify 風格的觸發事件，只取用 HTTP 方法
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

impl FunctionEvent {
    /// v1 事件的 `httpMethod`，否則 v2 的 `requestContext.http.method`
    pub fn method(&self) -> Option<&str> {
        self.http_method.as_deref().or_else(|| {
            self.request_context
                .as_ref()
                .and_then(|ctx| ctx.http.as_ref())
                .and_then(|http| http.method.as_deref())
        })
    }
}

/// 函式平台的 HTTP 回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    pub fn pdf(payload: &PdfPayload, filename: &str) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/pdf".to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename={}", filename),
            ),
            ("Cache-Control".to_string(), "no-cache".to_string()),
        ]);

        Self {
            status_code: 200,
            headers,
            body: payload.encoded.clone(),
            is_base64_encoded: true,
        }
    }

    pub fn error(err: &MenuPdfError) -> Self {
        let body = serde_json::json!({
            "error": err.category(),
            "message": err.to_string(),
            "details": format!("{:?}", err),
        });
        Self::json(err.status_code(), &body)
    }

    pub fn method_not_allowed() -> Self {
        Self::json(
            405,
            &serde_json::json!({
                "error": "method_not_allowed",
                "message": "Method Not Allowed",
            }),
        )
    }

    fn json(status_code: u16, body: &serde_json::Value) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: body.to_string(),
            is_base64_encoded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Canvas, FontFace, Rgb, TextStyle};

    fn document() -> RenderedDocument {
        let mut canvas = Canvas::new("Weekly Menu", 595.28, 841.89, 1.2);
        canvas.add_page();
        canvas.fill_rect(0.0, 50.0, 595.28, 26.0, Rgb(0.1, 0.1, 0.1));
        canvas.text(
            50.0,
            50.0,
            "Montag, 9. Dezember",
            &TextStyle::new(FontFace::Bold, 13.0, Rgb(0.98, 0.78, 0.1)),
        );
        canvas.finish().unwrap()
    }

    #[test]
    fn test_first_strategy_wins() {
        let payload =
            encode_with_fallback(&document(), &SerializationStrategy::DEFAULT_ORDER).unwrap();

        assert_eq!(payload.strategy, SerializationStrategy::CompressedStreams);
        assert!(payload.bytes.starts_with(b"%PDF-"));
        assert_eq!(STANDARD.decode(&payload.encoded).unwrap(), payload.bytes);
    }

    #[test]
    fn test_empty_output_falls_back_to_plain() {
        let document = document();
        let mut attempts = Vec::new();

        let payload = encode_first_usable(&SerializationStrategy::DEFAULT_ORDER, |strategy| {
            attempts.push(strategy);
            match strategy {
                SerializationStrategy::CompressedStreams => Ok(Vec::new()),
                SerializationStrategy::PlainStreams => strategy.serialize(&document),
            }
        })
        .unwrap();

        assert_eq!(attempts, SerializationStrategy::DEFAULT_ORDER.to_vec());
        assert_eq!(payload.strategy, SerializationStrategy::PlainStreams);
        assert!(lopdf::Document::load_mem(&payload.bytes).is_ok());
        assert_eq!(STANDARD.decode(&payload.encoded).unwrap(), payload.bytes);
    }

    #[test]
    fn test_failed_strategy_falls_back_to_plain() {
        let document = document();

        let payload = encode_first_usable(&SerializationStrategy::DEFAULT_ORDER, |strategy| {
            match strategy {
                SerializationStrategy::CompressedStreams => Err(MenuPdfError::EmptyDocument),
                SerializationStrategy::PlainStreams => strategy.serialize(&document),
            }
        })
        .unwrap();

        assert_eq!(payload.strategy, SerializationStrategy::PlainStreams);
        assert!(payload.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_all_strategies_empty_is_serialization_error() {
        let err = encode_first_usable(&SerializationStrategy::DEFAULT_ORDER, |_| Ok(Vec::new()))
            .unwrap_err();

        assert!(matches!(
            err,
            MenuPdfError::Serialization { ref attempted } if attempted == "compressed, plain"
        ));
        assert_eq!(err.category(), "serialization");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_plain_strategy_is_loadable() {
        let bytes = SerializationStrategy::PlainStreams
            .serialize(&document())
            .unwrap();
        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), 1);
    }

    #[test]
    fn test_no_strategies_is_serialization_error() {
        let err = encode_with_fallback(&document(), &[]).unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_pdf_response_contract() {
        let payload =
            encode_with_fallback(&document(), &[SerializationStrategy::PlainStreams]).unwrap();
        let response = FunctionResponse::pdf(&payload, "weekly-menu.pdf");

        assert_eq!(response.status_code, 200);
        assert!(response.is_base64_encoded);
        assert_eq!(response.headers["Content-Type"], "application/pdf");
        assert_eq!(
            response.headers["Content-Disposition"],
            "attachment; filename=weekly-menu.pdf"
        );
        assert_eq!(response.headers["Cache-Control"], "no-cache");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["isBase64Encoded"], true);
    }

    #[test]
    fn test_error_response_body() {
        let err = MenuPdfError::MissingData {
            collection: "days".to_string(),
        };
        let response = FunctionResponse::error(&err);

        assert_eq!(response.status_code, 500);
        assert!(!response.is_base64_encoded);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], "missing_data");
        assert!(body["message"].as_str().unwrap().contains("days"));
        assert!(body["details"].as_str().unwrap().contains("MissingData"));
    }

    #[test]
    fn test_event_method_from_either_shape() {
        let v1: FunctionEvent =
            serde_json::from_value(serde_json::json!({"httpMethod": "POST", "path": "/"})).unwrap();
        assert_eq!(v1.method(), Some("POST"));

        let v2: FunctionEvent = serde_json::from_value(serde_json::json!({
            "requestContext": {"http": {"method": "GET"}}
        }))
        .unwrap();
        assert_eq!(v2.method(), Some("GET"));

        let direct: FunctionEvent = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(direct.method(), None);
    }

    #[test]
    fn test_method_not_allowed() {
        let response = FunctionResponse::method_not_allowed();
        assert_eq!(response.status_code, 405);
        assert!(response.body.contains("Method Not Allowed"));
        assert!(!response.is_base64_encoded);
        assert_eq!(response.headers["Content-Type"], "application/json");
    }
}
