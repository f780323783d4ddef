use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// CMS 回傳的單筆項目：識別碼加上未型別化的欄位集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub data: HashMap<String, Value>,
}

/// 各 collection 使用的欄位名稱
pub mod fields {
    pub const NAME: &str = "name";
    pub const SORT_ORDER: &str = "sort-order";

    pub const DAY_DATE: &str = "date";
    pub const DAY_SOUP: &str = "soup";
    pub const DAY_MAIN: &str = "menu";
    pub const DAY_VEGETARIAN: &str = "vegi";

    pub const MENU_DESCRIPTION: &str = "short-description";
    pub const MENU_PRICE: &str = "price";

    pub const SPECIAL_FIRST_MENU: &str = "menu-1";
    pub const SPECIAL_SECOND_MENU: &str = "menu-2";
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// 非空字串欄位（去除前後空白）
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 整數欄位，接受數字或數字字串
    pub fn int_field(&self, key: &str) -> Option<i64> {
        match self.data.get(key)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 參考欄位：單一 id 或多重參考的第一個 id
    pub fn reference_field(&self, key: &str) -> Option<&str> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// 文字欄位，數字會格式化成兩位小數
    pub fn display_field(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => n.as_f64().map(|f| format!("{:.2}", f)),
            _ => None,
        }
    }

    pub fn date_field(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.str_field(key)?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub short_description: Option<String>,
    pub price: Option<String>,
}

impl MenuItem {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default().to_string(),
            short_description: record
                .str_field(fields::MENU_DESCRIPTION)
                .map(str::to_string),
            price: record.display_field(fields::MENU_PRICE),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayEntry {
    pub id: String,
    pub name: String,
    pub sort_order: Option<i64>,
    pub date: Option<NaiveDate>,
    pub soup: Option<String>,
    pub main: Option<String>,
    pub vegetarian: Option<String>,
}

impl DayEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default().to_string(),
            sort_order: record.int_field(fields::SORT_ORDER),
            date: record.date_field(fields::DAY_DATE),
            soup: record.reference_field(fields::DAY_SOUP).map(str::to_string),
            main: record.reference_field(fields::DAY_MAIN).map(str::to_string),
            vegetarian: record
                .reference_field(fields::DAY_VEGETARIAN)
                .map(str::to_string),
        }
    }

    /// 缺少排序值的項目排在最後
    pub fn sort_key(&self) -> i64 {
        self.sort_order.unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecialEntry {
    pub id: String,
    pub name: String,
    pub sort_order: Option<i64>,
    pub first_menu: Option<String>,
    pub second_menu: Option<String>,
}

impl SpecialEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default().to_string(),
            sort_order: record.int_field(fields::SORT_ORDER),
            first_menu: record
                .reference_field(fields::SPECIAL_FIRST_MENU)
                .map(str::to_string),
            second_menu: record
                .reference_field(fields::SPECIAL_SECOND_MENU)
                .map(str::to_string),
        }
    }

    pub fn sort_key(&self) -> i64 {
        self.sort_order.unwrap_or(i64::MAX)
    }
}

/// 三個 collection 的原始抓取結果
#[derive(Debug, Clone, Default)]
pub struct MenuData {
    pub days: Vec<Record>,
    pub menus: Vec<Record>,
    pub specials: Vec<Record>,
}
