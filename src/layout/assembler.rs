use crate::config::{DocumentConfig, LayoutConfig};
use crate::core::joiner::{JoinedDay, JoinedSpecial};
use crate::layout::canvas::{Canvas, RenderedDocument};
use crate::layout::cursor::PageCursor;
use crate::layout::sections::{render_day, render_specials, render_title, SectionContext};
use crate::utils::error::Result;

/// 依序繪製標題、每日菜單、specials 成為完整文件
pub struct DocumentAssembler<'a> {
    document: &'a DocumentConfig,
    layout: &'a LayoutConfig,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(document: &'a DocumentConfig, layout: &'a LayoutConfig) -> Self {
        Self { document, layout }
    }

    pub fn assemble(
        &self,
        days: &[JoinedDay],
        specials: &[JoinedSpecial],
    ) -> Result<RenderedDocument> {
        let ctx = SectionContext {
            layout: self.layout,
            document: self.document,
            locale: self.document.chrono_locale()?,
        };

        let mut canvas = Canvas::new(
            &self.document.title,
            self.layout.page_width,
            self.layout.page_height,
            self.layout.line_height,
        );
        canvas.add_page();
        let mut cursor = PageCursor::new(self.layout);

        render_title(&mut canvas, &mut cursor, &ctx);

        let mut ordered: Vec<&JoinedDay> = days.iter().collect();
        ordered.sort_by_key(|day| day.sort_order.unwrap_or(i64::MAX));
        for day in ordered {
            render_day(&mut canvas, &mut cursor, &ctx, day);
        }

        render_specials(&mut canvas, &mut cursor, &ctx, specials);

        let document = canvas.finish()?;
        tracing::info!(
            "📐 Laid out {} day(s), {} special(s) on {} page(s) ({} page break(s))",
            days.len(),
            specials.len(),
            document.page_count(),
            cursor.page_breaks()
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MenuItem;
    use chrono::NaiveDate;

    fn day(name: &str, order: i64) -> JoinedDay {
        JoinedDay {
            id: name.to_lowercase(),
            name: name.to_string(),
            sort_order: Some(order),
            date: None,
            soup: "Suppe".to_string(),
            main: "Menü".to_string(),
            vegetarian: "Vegi".to_string(),
        }
    }

    fn special(name: &str) -> JoinedSpecial {
        JoinedSpecial {
            id: name.to_lowercase(),
            name: name.to_string(),
            sort_order: None,
            first: MenuItem {
                id: format!("{}-menu", name),
                name: name.to_string(),
                short_description: None,
                price: Some("24.00".to_string()),
            },
            second: None,
        }
    }

    fn pdf_bytes(document: &RenderedDocument) -> Vec<u8> {
        let mut pdf = document.to_pdf().unwrap();
        let mut bytes = Vec::new();
        pdf.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_two_days_single_page_in_order() {
        let document = DocumentConfig::default();
        let layout = LayoutConfig::default();
        let assembler = DocumentAssembler::new(&document, &layout);

        let mut tuesday = day("Tuesday", 1);
        tuesday.date = NaiveDate::from_ymd_opt(2024, 12, 10);
        let days = vec![tuesday, day("Monday", 0)];

        let rendered = assembler.assemble(&days, &[special("Fondue")]).unwrap();
        assert_eq!(rendered.page_count(), 1);

        let texts: Vec<_> = rendered.text_runs().map(|run| run.text).collect();
        let monday = texts.iter().position(|t| *t == "Monday").unwrap();
        let tuesday = texts.iter().position(|t| *t == "Tuesday, 10 December").unwrap();
        assert!(monday < tuesday);
        assert_eq!(texts[0], "Weekly Menu");
        assert!(texts.contains(&"Fondue"));
    }

    #[test]
    fn test_full_week_paginates() {
        let document = DocumentConfig::default();
        let layout = LayoutConfig::default();
        let assembler = DocumentAssembler::new(&document, &layout);

        let days: Vec<_> = (0..7).map(|i| day(&format!("Day {}", i), i)).collect();
        let rendered = assembler.assemble(&days, &[]).unwrap();

        // 110 + 6 * 100 = 710，第七天需要換頁
        assert_eq!(rendered.page_count(), 2);
        let last_day = rendered.text_runs().find(|run| run.text == "Day 6").unwrap();
        assert_eq!(last_day.page, 1);
    }

    #[test]
    fn test_same_input_same_bytes() {
        let document = DocumentConfig::default();
        let layout = LayoutConfig::default();
        let assembler = DocumentAssembler::new(&document, &layout);
        let days = vec![day("Monday", 0), day("Tuesday", 1)];
        let specials = vec![special("Fondue"), special("Raclette")];

        let first = pdf_bytes(&assembler.assemble(&days, &specials).unwrap());
        let second = pdf_bytes(&assembler.assemble(&days, &specials).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_locale_is_config_error() {
        let mut document = DocumentConfig::default();
        document.locale = "xx_YY".to_string();
        let layout = LayoutConfig::default();

        let result = DocumentAssembler::new(&document, &layout).assemble(&[], &[]);
        assert!(result.unwrap_err().is_config_error());
    }
}
