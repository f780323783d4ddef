use crate::config::{AppConfig, CmsConfig, DocumentConfig, HttpPolicy, LayoutConfig};
use crate::utils::error::{MenuPdfError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub cms: CmsConfig,
    pub document: Option<DocumentConfig>,
    pub layout: Option<LayoutConfig>,
    pub http: Option<HttpPolicy>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置，`${VAR}` 取自行程環境變數
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with(path, |key| std::env::var(key).ok())
    }

    pub fn from_file_with<P, F>(path: P, lookup: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(&path).map_err(MenuPdfError::IoError)?;
        Self::from_toml_str_with(&content, lookup)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_toml_str_with(content, |key| std::env::var(key).ok())
    }

    pub fn from_toml_str_with<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let processed_content = Self::substitute_vars(content, lookup)?;

        toml::from_str(&processed_content).map_err(|e| MenuPdfError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 `${VAR}`；任何未設定的變數都是設定錯誤
    fn substitute_vars<F>(content: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MenuPdfError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let mut unresolved: Vec<String> = Vec::new();
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| {
                if !unresolved.iter().any(|name| name == var_name) {
                    unresolved.push(var_name.to_string());
                }
                String::new()
            })
        });

        if !unresolved.is_empty() {
            return Err(MenuPdfError::ConfigError {
                message: format!(
                    "Unresolved environment variable(s) in configuration: {}",
                    unresolved.join(", ")
                ),
            });
        }

        Ok(result.into_owned())
    }

    pub fn into_app_config(self) -> AppConfig {
        AppConfig {
            cms: self.cms,
            document: self.document.unwrap_or_default(),
            layout: self.layout.unwrap_or_default(),
            http: self.http.unwrap_or_default(),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_app_config().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[cms]
access_token = "abc123"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap().into_app_config();

        assert_eq!(config.cms.access_token, "abc123");
        assert_eq!(config.cms.api_base, "https://api.webflow.com/v2");
        assert_eq!(config.cms.collections.days, "6751551dff6ac96b352ca4c6");
        assert_eq!(config.document.filename, "weekly-menu.pdf");
        assert!(config.http.require_get);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let toml_content = r#"
[cms]
access_token = "abc123"
page_limit = 50

[cms.collections]
days = "days-id"

[document]
locale = "de_CH"
date_format = "%A, %-d. %B"

[document.labels]
soup = "Suppe"
vegetarian = "Vegetarisch"

[layout]
day_page_bottom = 700.0
bar_color = [0.2, 0.2, 0.2]

[http]
require_get = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap().into_app_config();

        assert_eq!(config.cms.page_limit, 50);
        assert_eq!(config.cms.collections.days, "days-id");
        assert_eq!(config.cms.collections.menus, "6751555ed7176b5124a30b18");
        assert_eq!(config.document.labels.soup, "Suppe");
        assert_eq!(config.document.labels.main, "Menu");
        assert_eq!(config.document.title, "Weekly Menu");
        assert_eq!(config.layout.day_page_bottom, 700.0);
        assert_eq!(config.layout.specials_page_bottom, 790.0);
        assert!(!config.http.require_get);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_MENU_PDF_TOKEN", "from-env");

        let toml_content = r#"
[cms]
access_token = "${TEST_MENU_PDF_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.cms.access_token, "from-env");

        std::env::remove_var("TEST_MENU_PDF_TOKEN");
    }

    #[test]
    fn test_missing_cms_section_is_error() {
        let toml_content = r#"
[document]
title = "Menu"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(MenuPdfError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[cms]
api_base = "invalid-url"
access_token = "abc"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_config_parses() {
        let config = TomlConfig::from_toml_str_with(include_str!("../../config/menu.toml"), |key| {
            (key == "WEBFLOW_ACCESS_TOKEN").then(|| "sample-token".to_string())
        })
        .unwrap()
        .into_app_config();

        assert_eq!(config.cms.access_token, "sample-token");
        assert_eq!(config.document.locale, "de_CH");
        assert_eq!(config.document.labels.specials, "Spezialitäten");
        assert_eq!(config.cms.timeout_seconds, Some(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unset_variable_is_config_error() {
        let toml_content = r#"
[cms]
access_token = "${MENU_PDF_UNSET_TOKEN}"
api_base = "${MENU_PDF_UNSET_BASE}"
"#;

        let err = TomlConfig::from_toml_str_with(toml_content, |_| None).unwrap_err();
        assert!(err.is_config_error());
        let message = err.to_string();
        assert!(message.contains("MENU_PDF_UNSET_TOKEN"));
        assert!(message.contains("MENU_PDF_UNSET_BASE"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[cms]
access_token = "file-token"

[document]
title = "Wochenmenü"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap().into_app_config();
        assert_eq!(config.document.title, "Wochenmenü");
    }
}
