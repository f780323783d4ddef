use crate::config::LayoutConfig;
use crate::layout::canvas::Canvas;

/// 整個繪製流程共用的垂直位置。換頁不可撤銷，也不往後預先量測。
#[derive(Debug)]
pub struct PageCursor {
    y: f32,
    margin: f32,
    content_width: f32,
    bar_extension: f32,
    page_breaks: usize,
}

impl PageCursor {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            y: layout.margin,
            margin: layout.margin,
            content_width: layout.content_width(),
            bar_extension: layout.bar_extension,
            page_breaks: 0,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.content_width
    }

    pub fn page_breaks(&self) -> usize {
        self.page_breaks
    }

    pub fn advance(&mut self, dy: f32) {
        self.y += dy;
    }

    /// 只會往下移動
    pub fn advance_to(&mut self, y: f32) {
        self.y = self.y.max(y);
    }

    /// 日期橫條左緣，超出左邊界 `bar_extension`
    pub fn bar_x(&self) -> f32 {
        self.margin - self.bar_extension
    }

    pub fn bar_width(&self) -> f32 {
        self.content_width + 2.0 * self.bar_extension
    }

    /// 若區塊會超過 `page_bottom` 就換頁並回到上邊界
    pub fn ensure_room(&mut self, canvas: &mut Canvas, block_height: f32, page_bottom: f32) -> bool {
        if self.y + block_height <= page_bottom {
            return false;
        }

        canvas.add_page();
        self.page_breaks += 1;
        tracing::debug!(
            "↩️ Page break at y={:.1} (block {:.1}, limit {:.1})",
            self.y,
            block_height,
            page_bottom
        );
        self.y = self.margin;
        true
    }
}
