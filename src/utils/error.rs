use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuPdfError {
    #[error("CMS request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("CMS collection '{collection}' returned status {status}: {body}")]
    CmsStatus {
        collection: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected CMS payload for collection '{collection}': {message}")]
    CmsPayload { collection: String, message: String },

    #[error("Required collection '{collection}' returned no items")]
    MissingData { collection: String },

    #[error("Rendered document has no pages")]
    EmptyDocument,

    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF serialization produced no output (tried: {attempted})")]
    Serialization { attempted: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl MenuPdfError {
    /// 錯誤分類，作為回應 JSON 的 `error` 欄位
    pub fn category(&self) -> &'static str {
        match self {
            MenuPdfError::Fetch(_)
            | MenuPdfError::CmsStatus { .. }
            | MenuPdfError::CmsPayload { .. } => "upstream_fetch",
            MenuPdfError::MissingData { .. } => "missing_data",
            MenuPdfError::EmptyDocument | MenuPdfError::Pdf(_) => "render",
            MenuPdfError::Serialization { .. } => "serialization",
            MenuPdfError::IoError(_) => "internal",
            MenuPdfError::ConfigError { .. }
            | MenuPdfError::InvalidConfigValueError { .. }
            | MenuPdfError::MissingConfigError { .. } => "configuration",
        }
    }

    /// 所有管線錯誤都回傳 500
    pub fn status_code(&self) -> u16 {
        500
    }

    pub fn is_config_error(&self) -> bool {
        self.category() == "configuration"
    }
}

pub type Result<T> = std::result::Result<T, MenuPdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_distinct_for_fetch_and_serialization() {
        let fetch = MenuPdfError::CmsStatus {
            collection: "days".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        };
        let serialization = MenuPdfError::Serialization {
            attempted: "compressed, plain".to_string(),
        };

        assert_eq!(fetch.category(), "upstream_fetch");
        assert_eq!(serialization.category(), "serialization");
        assert_ne!(fetch.to_string(), serialization.to_string());
    }

    #[test]
    fn test_missing_data_and_empty_document() {
        let missing = MenuPdfError::MissingData {
            collection: "menus".to_string(),
        };
        assert_eq!(missing.category(), "missing_data");
        assert_eq!(missing.status_code(), 500);
        assert!(missing.to_string().contains("menus"));

        assert_eq!(MenuPdfError::EmptyDocument.category(), "render");
    }

    #[test]
    fn test_config_errors() {
        let err = MenuPdfError::MissingConfigError {
            field: "cms.access_token".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!MenuPdfError::EmptyDocument.is_config_error());
    }
}
