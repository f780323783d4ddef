use crate::config::toml_config::TomlConfig;
use crate::config::AppConfig;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::Parser;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "weekly-menu-pdf")]
#[command(about = "Render the weekly menu from the CMS into a PDF")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, env = "WEBFLOW_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Override the PDF filename")]
    pub filename: Option<String>,

    #[arg(long, help = "Locale used for weekday and month names, e.g. de_CH")]
    pub locale: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn to_app_config(&self) -> Result<AppConfig> {
        let mut app = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_app_config(),
            None => AppConfig::default(),
        };

        if let Some(token) = &self.token {
            app.cms.access_token = token.clone();
        }
        if let Some(api_base) = &self.api_base {
            app.cms.api_base = api_base.clone();
        }
        if let Some(filename) = &self.filename {
            app.document.filename = filename.clone();
        }
        if let Some(locale) = &self.locale {
            app.document.locale = locale.clone();
        }

        Ok(app)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        self.to_app_config()?.validate()
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
