//! 標題、每日菜單與 specials 三種區塊的繪製

use crate::config::{DocumentConfig, LayoutConfig};
use crate::core::joiner::{JoinedDay, JoinedSpecial};
use crate::domain::model::MenuItem;
use crate::layout::canvas::{Canvas, TextStyle};
use crate::layout::cursor::PageCursor;
use crate::layout::metrics::FontFace;
use chrono::{Locale, NaiveDate};
use std::fmt::Write;

/// specials 最多佔用的欄數，多出來的不換列
pub const MAX_SPECIAL_COLUMNS: usize = 3;

pub struct SectionContext<'a> {
    pub layout: &'a LayoutConfig,
    pub document: &'a DocumentConfig,
    pub locale: Locale,
}

impl SectionContext<'_> {
    fn label_style(&self) -> TextStyle {
        let layout = self.layout;
        TextStyle::new(FontFace::Bold, layout.label_size, layout.text_color)
            .with_opacity(layout.label_opacity)
    }

    fn item_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Regular, self.layout.item_size, self.layout.text_color)
    }

    /// 星期、日、月，使用設定的語系；日期無效時退回日期名稱
    pub fn day_label(&self, day: &JoinedDay) -> String {
        day.date
            .and_then(|date| format_date(date, &self.document.date_format, self.locale))
            .unwrap_or_else(|| day.name.clone())
    }
}

fn format_date(date: NaiveDate, pattern: &str, locale: Locale) -> Option<String> {
    let mut label = String::new();
    // 格式字串錯誤時 Display 會回傳 Err
    write!(label, "{}", date.format_localized(pattern, locale)).ok()?;
    Some(label)
}

pub fn render_title(canvas: &mut Canvas, cursor: &mut PageCursor, ctx: &SectionContext<'_>) {
    let layout = ctx.layout;

    let title_style = TextStyle::new(FontFace::Bold, layout.title_size, layout.text_color);
    canvas.text(cursor.margin(), cursor.y(), &ctx.document.title, &title_style);
    cursor.advance(layout.title_advance);

    let subtitle_style = TextStyle::new(FontFace::Regular, layout.subtitle_size, layout.text_color)
        .with_opacity(layout.subtitle_opacity);
    canvas.text_block(
        cursor.margin(),
        cursor.y(),
        cursor.content_width(),
        &ctx.document.subtitle,
        &subtitle_style,
    );
    cursor.advance(layout.subtitle_advance);
}

/// 滿版深色橫條，左右超出邊界，上面疊一行強調色文字
fn render_bar(canvas: &mut Canvas, cursor: &PageCursor, layout: &LayoutConfig, label: &str) {
    let top = cursor.y();
    canvas.fill_rect(
        cursor.bar_x(),
        top,
        cursor.bar_width(),
        layout.bar_height,
        layout.bar_color,
    );

    let style = TextStyle::new(FontFace::Bold, layout.bar_text_size, layout.accent_color);
    let text_y = top + (layout.bar_height - layout.bar_text_size) / 2.0;
    canvas.text(cursor.margin(), text_y, label, &style);
}

pub fn render_day(
    canvas: &mut Canvas,
    cursor: &mut PageCursor,
    ctx: &SectionContext<'_>,
    day: &JoinedDay,
) {
    let layout = ctx.layout;
    cursor.ensure_room(canvas, layout.day_block_height, layout.day_page_bottom);

    let top = cursor.y();
    render_bar(canvas, cursor, layout, &ctx.day_label(day));

    let labels = &ctx.document.labels;
    let columns = [
        (labels.soup.as_str(), day.soup.as_str()),
        (labels.main.as_str(), day.main.as_str()),
        (labels.vegetarian.as_str(), day.vegetarian.as_str()),
    ];

    let label_style = ctx.label_style();
    let item_style = ctx.item_style();
    let column_y = top + layout.content_offset;

    for (offset, (label, value)) in layout.column_offsets.iter().zip(columns) {
        let x = cursor.margin() + offset;
        let label_height =
            canvas.text_block(x, column_y, layout.column_width, label, &label_style);
        canvas.text_block(
            x,
            column_y + label_height.max(layout.label_gap),
            layout.column_width,
            value,
            &item_style,
        );
    }

    // 固定推進，過長的菜名可能溢出到下一個區塊
    cursor.advance(layout.day_block_height);
}

pub fn render_specials(
    canvas: &mut Canvas,
    cursor: &mut PageCursor,
    ctx: &SectionContext<'_>,
    specials: &[JoinedSpecial],
) {
    let layout = ctx.layout;
    let column_count = MAX_SPECIAL_COLUMNS.min(layout.column_offsets.len());
    if specials.len() > column_count {
        tracing::debug!(
            "✂️ Rendering {} of {} specials, remaining columns omitted",
            column_count,
            specials.len()
        );
    }

    // 預估高度是下限，實際內容較高時以量測結果換頁
    let tallest = specials
        .iter()
        .take(column_count)
        .map(|special| special_column_height(canvas, ctx, special))
        .fold(0.0, f32::max);
    let block_height = layout
        .specials_estimated_height
        .max(layout.content_offset + tallest);
    cursor.ensure_room(canvas, block_height, layout.specials_page_bottom);

    render_bar(canvas, cursor, layout, &ctx.document.labels.specials);

    let start_y = cursor.y() + layout.content_offset;
    let mut bottom = start_y;
    for (offset, special) in layout.column_offsets.iter().zip(specials).take(column_count) {
        let x = cursor.margin() + offset;
        let mut y = start_y;

        for item in special_items(special) {
            y = render_special_item(canvas, ctx, x, y, item);
        }

        bottom = bottom.max(y);
    }

    cursor.advance_to(bottom);
}

fn special_items(special: &JoinedSpecial) -> impl Iterator<Item = &MenuItem> {
    std::iter::once(&special.first).chain(special.second.as_ref())
}

/// 名稱、描述、價格依序繪製的文字與樣式
fn special_item_runs<'i>(
    ctx: &SectionContext<'_>,
    item: &'i MenuItem,
) -> Vec<(&'i str, TextStyle)> {
    let layout = ctx.layout;
    let mut runs = vec![(
        item.name.as_str(),
        TextStyle::new(FontFace::Bold, layout.item_size, layout.text_color),
    )];

    if let Some(description) = &item.short_description {
        let style = TextStyle::new(FontFace::Regular, layout.description_size, layout.text_color)
            .with_opacity(layout.description_opacity);
        runs.push((description.as_str(), style));
    }

    if let Some(price) = &item.price {
        let style = TextStyle::new(FontFace::Regular, layout.price_size, layout.text_color);
        runs.push((price.as_str(), style));
    }

    runs
}

fn special_column_height(
    canvas: &Canvas,
    ctx: &SectionContext<'_>,
    special: &JoinedSpecial,
) -> f32 {
    let layout = ctx.layout;
    special_items(special)
        .map(|item| {
            special_item_runs(ctx, item)
                .iter()
                .map(|(text, style)| canvas.measure_block(layout.column_width, text, style))
                .sum::<f32>()
                + layout.item_gap
        })
        .sum()
}

/// 回傳此項目下方的新 y
fn render_special_item(
    canvas: &mut Canvas,
    ctx: &SectionContext<'_>,
    x: f32,
    mut y: f32,
    item: &MenuItem,
) -> f32 {
    for (text, style) in special_item_runs(ctx, item) {
        y += canvas.text_block(x, y, ctx.layout.column_width, text, &style);
    }

    y + ctx.layout.item_gap
}
