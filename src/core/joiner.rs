use crate::domain::model::{DayEntry, MenuItem, Record, SpecialEntry};
use chrono::NaiveDate;
use std::collections::HashMap;

/// id → MenuItem 對照表，每次請求建立一次
#[derive(Debug, Clone, Default)]
pub struct MenuIndex {
    items: HashMap<String, MenuItem>,
}

impl MenuIndex {
    pub fn from_records(records: &[Record]) -> Self {
        let items = records
            .iter()
            .map(|record| (record.id.clone(), MenuItem::from_record(record)))
            .collect();
        Self { items }
    }

    pub fn insert(&mut self, item: MenuItem) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Option<&str>) -> Option<&MenuItem> {
        id.and_then(|id| self.items.get(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// 找不到時回傳空字串，不視為錯誤
    pub fn name_of(&self, id: Option<&str>) -> String {
        self.get(id).map(|item| item.name.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedDay {
    pub id: String,
    pub name: String,
    pub sort_order: Option<i64>,
    pub date: Option<NaiveDate>,
    pub soup: String,
    pub main: String,
    pub vegetarian: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedSpecial {
    pub id: String,
    pub name: String,
    pub sort_order: Option<i64>,
    pub first: MenuItem,
    pub second: Option<MenuItem>,
}

/// 依排序值穩定排序（相同排序值保留原始順序）
pub fn sorted_days(records: &[Record]) -> Vec<DayEntry> {
    let mut days: Vec<DayEntry> = records.iter().map(DayEntry::from_record).collect();
    days.sort_by_key(DayEntry::sort_key);
    days
}

pub fn sorted_specials(records: &[Record]) -> Vec<SpecialEntry> {
    let mut specials: Vec<SpecialEntry> = records.iter().map(SpecialEntry::from_record).collect();
    specials.sort_by_key(SpecialEntry::sort_key);
    specials
}

pub fn join_days(records: &[Record], index: &MenuIndex) -> Vec<JoinedDay> {
    sorted_days(records)
        .into_iter()
        .map(|day| {
            let joined = JoinedDay {
                soup: index.name_of(day.soup.as_deref()),
                main: index.name_of(day.main.as_deref()),
                vegetarian: index.name_of(day.vegetarian.as_deref()),
                id: day.id,
                name: day.name,
                sort_order: day.sort_order,
                date: day.date,
            };
            tracing::debug!(
                "🔗 Day '{}' (order {:?}) joined: soup='{}', main='{}', vegetarian='{}'",
                joined.name,
                joined.sort_order,
                joined.soup,
                joined.main,
                joined.vegetarian
            );
            joined
        })
        .collect()
}

/// 第一個參考無法解析的 special 整筆略過；第二個參考可有可無
pub fn join_specials(records: &[Record], index: &MenuIndex) -> Vec<JoinedSpecial> {
    sorted_specials(records)
        .into_iter()
        .filter_map(|special| {
            let Some(first) = index.get(special.first_menu.as_deref()).cloned() else {
                tracing::debug!(
                    "⏭️ Skipping special '{}': first menu {:?} not found",
                    special.name,
                    special.first_menu
                );
                return None;
            };

            Some(JoinedSpecial {
                second: index.get(special.second_menu.as_deref()).cloned(),
                first,
                id: special.id,
                name: special.name,
                sort_order: special.sort_order,
            })
        })
        .collect()
}

/// specials 參考到、但不在對照表中的 menu id，依 special 排序分組
pub fn unresolved_special_refs(records: &[Record], index: &MenuIndex) -> Vec<[Option<String>; 2]> {
    sorted_specials(records)
        .into_iter()
        .map(|special| {
            let missing = |id: Option<String>| id.filter(|id| !index.contains(id));
            [missing(special.first_menu), missing(special.second_menu)]
        })
        .filter(|slots| slots.iter().any(Option::is_some))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn menu(id: &str, name: &str) -> Record {
        Record::new(id).with_field("name", json!(name))
    }

    fn day(id: &str, order: i64, soup: &str, main: &str, vegi: &str) -> Record {
        Record::new(id)
            .with_field("name", json!(id))
            .with_field("sort-order", json!(order))
            .with_field("soup", json!(soup))
            .with_field("menu", json!(main))
            .with_field("vegi", json!(vegi))
    }

    fn special(id: &str, order: i64, first: Option<&str>, second: Option<&str>) -> Record {
        let mut record = Record::new(id)
            .with_field("name", json!(id))
            .with_field("sort-order", json!(order));
        if let Some(first) = first {
            record = record.with_field("menu-1", json!(first));
        }
        if let Some(second) = second {
            record = record.with_field("menu-2", json!(second));
        }
        record
    }

    fn index() -> MenuIndex {
        MenuIndex::from_records(&[
            menu("m-soup", "Kürbissuppe"),
            menu("m-main", "Rindsgeschnetzeltes"),
            menu("m-vegi", "Gemüsecurry"),
        ])
    }

    #[test]
    fn test_name_of_missing_is_empty() {
        let index = index();
        assert_eq!(index.name_of(Some("m-soup")), "Kürbissuppe");
        assert_eq!(index.name_of(Some("unknown")), "");
        assert_eq!(index.name_of(None), "");
    }

    #[test]
    fn test_days_sorted_ascending() {
        let records = vec![
            day("wed", 2, "m-soup", "m-main", "m-vegi"),
            day("mon", 0, "m-soup", "m-main", "m-vegi"),
            day("tue", 1, "m-soup", "m-main", "m-vegi"),
        ];

        let joined = join_days(&records, &index());
        let ids: Vec<_> = joined.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["mon", "tue", "wed"]);
    }

    #[test]
    fn test_days_sort_is_stable_for_ties() {
        let records = vec![
            day("b", 1, "", "", ""),
            day("a", 1, "", "", ""),
            day("first", 0, "", "", ""),
            day("c", 1, "", "", ""),
        ];

        let ids: Vec<_> = join_days(&records, &index())
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["first", "b", "a", "c"]);
    }

    #[test]
    fn test_day_lookup_miss_is_blank() {
        let records = vec![day("mon", 0, "m-soup", "gone", "m-vegi")];
        let joined = join_days(&records, &index());

        assert_eq!(joined[0].soup, "Kürbissuppe");
        assert_eq!(joined[0].main, "");
        assert_eq!(joined[0].vegetarian, "Gemüsecurry");
    }

    #[test]
    fn test_specials_skip_unresolvable_first() {
        let records = vec![
            special("s-2", 2, Some("m-main"), Some("gone")),
            special("s-1", 1, Some("gone"), Some("m-vegi")),
            special("s-0", 0, Some("m-soup"), Some("m-vegi")),
            special("s-3", 3, None, None),
        ];

        let joined = join_specials(&records, &index());
        let ids: Vec<_> = joined.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s-0", "s-2"]);

        assert_eq!(joined[0].second.as_ref().map(|m| m.name.as_str()), Some("Gemüsecurry"));
        assert_eq!(joined[1].second, None);
    }

    #[test]
    fn test_unresolved_special_refs() {
        let records = vec![
            special("s-1", 1, Some("m-soup"), Some("remote-2")),
            special("s-0", 0, Some("remote-1"), None),
            special("s-2", 2, Some("m-main"), None),
        ];

        let missing = unresolved_special_refs(&records, &index());
        assert_eq!(
            missing,
            vec![
                [Some("remote-1".to_string()), None],
                [None, Some("remote-2".to_string())],
            ]
        );
    }
}
