#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod toml_config;

use crate::layout::Rgb;
use crate::utils::error::{MenuPdfError, Result};
use crate::utils::validation::{
    validate_filename, validate_non_empty_string, validate_range, validate_url, Validate,
};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, LocalStorage};

pub const DEFAULT_API_BASE: &str = "https://api.webflow.com/v2";
pub const DEFAULT_DAYS_COLLECTION: &str = "6751551dff6ac96b352ca4c6";
pub const DEFAULT_MENUS_COLLECTION: &str = "6751555ed7176b5124a30b18";
pub const DEFAULT_SPECIALS_COLLECTION: &str = "6751627b5dd6627f953af343";

/// 單次請求（或整個行程）共用的不可變設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub cms: CmsConfig,
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub http: HttpPolicy,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub api_base: String,
    pub access_token: String,
    pub collections: CollectionIds,
    pub page_limit: usize,
    pub timeout_seconds: Option<u64>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: String::new(),
            collections: CollectionIds::default(),
            page_limit: 100,
            timeout_seconds: None,
        }
    }
}

// token 不寫進日誌
impl fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmsConfig")
            .field("api_base", &self.api_base)
            .field("access_token", &"***")
            .field("collections", &self.collections)
            .field("page_limit", &self.page_limit)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionIds {
    pub days: String,
    pub menus: String,
    pub specials: String,
}

impl Default for CollectionIds {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS_COLLECTION.to_string(),
            menus: DEFAULT_MENUS_COLLECTION.to_string(),
            specials: DEFAULT_SPECIALS_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub title: String,
    /// 價格說明，以較低不透明度顯示在標題下方
    pub subtitle: String,
    pub filename: String,
    pub locale: String,
    pub date_format: String,
    pub labels: Labels,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Weekly Menu".to_string(),
            subtitle: "Prices in CHF · Soup 6.50 · Menu 17.50 · Vegetarian 16.50".to_string(),
            filename: "weekly-menu.pdf".to_string(),
            locale: "en_US".to_string(),
            date_format: "%A, %-d %B".to_string(),
            labels: Labels::default(),
        }
    }
}

impl DocumentConfig {
    pub fn chrono_locale(&self) -> Result<Locale> {
        Locale::try_from(self.locale.as_str()).map_err(|_| MenuPdfError::InvalidConfigValueError {
            field: "document.locale".to_string(),
            value: self.locale.clone(),
            reason: "Unknown locale".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub soup: String,
    pub main: String,
    pub vegetarian: String,
    pub specials: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            soup: "Soup".to_string(),
            main: "Menu".to_string(),
            vegetarian: "Vegetarian".to_string(),
            specials: "Specials".to_string(),
        }
    }
}

/// 版面常數，單位為 PostScript point，y 軸由頁面頂端往下
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// 日期橫條往左右邊界外延伸的距離
    pub bar_extension: f32,
    pub bar_height: f32,
    pub bar_text_size: f32,

    pub title_size: f32,
    pub title_advance: f32,
    pub subtitle_size: f32,
    pub subtitle_opacity: f32,
    pub subtitle_advance: f32,

    /// 欄位相對左邊界的 x 位置
    pub column_offsets: Vec<f32>,
    pub column_width: f32,
    pub content_offset: f32,
    pub label_size: f32,
    pub label_opacity: f32,
    pub label_gap: f32,
    pub item_size: f32,
    pub line_height: f32,

    /// 每個日期區塊固定推進的高度，不依實際換行高度調整
    pub day_block_height: f32,
    pub day_page_bottom: f32,

    pub specials_estimated_height: f32,
    pub specials_page_bottom: f32,
    pub description_size: f32,
    pub description_opacity: f32,
    pub price_size: f32,
    pub item_gap: f32,

    pub bar_color: Rgb,
    pub accent_color: Rgb,
    pub text_color: Rgb,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 50.0,
            bar_extension: 50.0,
            bar_height: 26.0,
            bar_text_size: 13.0,

            title_size: 24.0,
            title_advance: 32.0,
            subtitle_size: 10.0,
            subtitle_opacity: 0.6,
            subtitle_advance: 28.0,

            column_offsets: vec![0.0, 170.0, 340.0],
            column_width: 150.0,
            content_offset: 36.0,
            label_size: 9.0,
            label_opacity: 0.6,
            label_gap: 13.0,
            item_size: 11.0,
            line_height: 1.2,

            day_block_height: 100.0,
            day_page_bottom: 760.0,

            specials_estimated_height: 150.0,
            specials_page_bottom: 790.0,
            description_size: 9.0,
            description_opacity: 0.6,
            price_size: 10.0,
            item_gap: 8.0,

            bar_color: Rgb(0.1, 0.1, 0.1),
            accent_color: Rgb(0.98, 0.78, 0.1),
            text_color: Rgb(0.0, 0.0, 0.0),
        }
    }
}

impl LayoutConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpPolicy {
    /// 只接受 GET；關閉後所有方法都會產生 PDF
    pub require_get: bool,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self { require_get: true }
    }
}

impl Validate for CmsConfig {
    fn validate(&self) -> Result<()> {
        validate_url("cms.api_base", &self.api_base)?;

        if self.access_token.trim().is_empty() {
            return Err(MenuPdfError::MissingConfigError {
                field: "cms.access_token".to_string(),
            });
        }

        validate_non_empty_string("cms.collections.days", &self.collections.days)?;
        validate_non_empty_string("cms.collections.menus", &self.collections.menus)?;
        validate_non_empty_string("cms.collections.specials", &self.collections.specials)?;

        validate_range("cms.page_limit", self.page_limit, 1, 100)?;

        Ok(())
    }
}

impl Validate for DocumentConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("document.title", &self.title)?;
        validate_filename("document.filename", &self.filename)?;
        validate_non_empty_string("document.date_format", &self.date_format)?;
        self.chrono_locale()?;
        Ok(())
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        validate_range("layout.margin", self.margin, 0.0, self.page_width / 2.0)?;
        validate_range(
            "layout.day_page_bottom",
            self.day_page_bottom,
            self.margin,
            self.page_height,
        )?;
        validate_range(
            "layout.specials_page_bottom",
            self.specials_page_bottom,
            self.margin,
            self.page_height,
        )?;
        validate_range("layout.subtitle_opacity", self.subtitle_opacity, 0.0, 1.0)?;
        validate_range("layout.label_opacity", self.label_opacity, 0.0, 1.0)?;
        validate_range(
            "layout.description_opacity",
            self.description_opacity,
            0.0,
            1.0,
        )?;

        if self.day_block_height <= 0.0 {
            return Err(MenuPdfError::InvalidConfigValueError {
                field: "layout.day_block_height".to_string(),
                value: self.day_block_height.to_string(),
                reason: "Day block height must be positive".to_string(),
            });
        }

        if self.column_offsets.is_empty() {
            return Err(MenuPdfError::InvalidConfigValueError {
                field: "layout.column_offsets".to_string(),
                value: "[]".to_string(),
                reason: "At least one column is required".to_string(),
            });
        }

        for offset in &self.column_offsets {
            validate_range(
                "layout.column_offsets",
                offset + self.column_width,
                0.0,
                self.content_width() + self.bar_extension,
            )?;
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.cms.validate()?;
        self.document.validate()?;
        self.layout.validate()?;
        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
