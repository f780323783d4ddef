use crate::config::toml_config::TomlConfig;
use crate::config::AppConfig;
use crate::utils::error::{MenuPdfError, Result};
use crate::utils::validation::Validate;
use std::env;

pub const ENV_ACCESS_TOKEN: &str = "WEBFLOW_ACCESS_TOKEN";
pub const ENV_API_BASE: &str = "WEBFLOW_API_BASE";
pub const ENV_DAYS_COLLECTION: &str = "DAYS_COLLECTION_ID";
pub const ENV_MENUS_COLLECTION: &str = "MENUS_COLLECTION_ID";
pub const ENV_SPECIALS_COLLECTION: &str = "SPECIALS_COLLECTION_ID";
pub const ENV_CONFIG_PATH: &str = "MENU_PDF_CONFIG";
pub const ENV_REQUIRE_GET: &str = "REQUIRE_GET";

/// 函式環境的設定：可選的 TOML 檔為基底，再套用環境變數
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub app: AppConfig,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut app = match lookup(ENV_CONFIG_PATH) {
            Some(path) => TomlConfig::from_file_with(&path, &lookup)?.into_app_config(),
            None => AppConfig::default(),
        };

        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            app.cms.access_token = token;
        }
        if app.cms.access_token.trim().is_empty() {
            return Err(MenuPdfError::ConfigError {
                message: format!("{} environment variable is required", ENV_ACCESS_TOKEN),
            });
        }

        if let Some(api_base) = lookup(ENV_API_BASE) {
            app.cms.api_base = api_base;
        }
        if let Some(days) = lookup(ENV_DAYS_COLLECTION) {
            app.cms.collections.days = days;
        }
        if let Some(menus) = lookup(ENV_MENUS_COLLECTION) {
            app.cms.collections.menus = menus;
        }
        if let Some(specials) = lookup(ENV_SPECIALS_COLLECTION) {
            app.cms.collections.specials = specials;
        }
        if let Some(require_get) = lookup(ENV_REQUIRE_GET) {
            app.http.require_get = parse_flag(ENV_REQUIRE_GET, &require_get)?;
        }

        Ok(Self { app })
    }

    pub fn into_app_config(self) -> AppConfig {
        self.app
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.app.validate()?;
        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn parse_flag(field_name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MenuPdfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a boolean flag".to_string(),
        }),
    }
}
