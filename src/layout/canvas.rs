use crate::layout::metrics::{encode_win_ansi, wrap_text, FontFace};
use crate::utils::error::{MenuPdfError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 0.0..=1.0 的 RGB 色彩
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
    pub opacity: f32,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f32, color: Rgb) -> Self {
        Self {
            face,
            size,
            color,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// 座標以頁面左上角為原點，y 往下
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub page: usize,
    pub x: f32,
    pub y: f32,
    pub text: &'a str,
    pub style: &'a TextStyle,
}

/// 繪圖指令的累積器，由組版流程獨佔直到 `finish`
#[derive(Debug)]
pub struct Canvas {
    title: String,
    width: f32,
    height: f32,
    line_height: f32,
    pages: Vec<Page>,
}

impl Canvas {
    pub fn new(title: impl Into<String>, width: f32, height: f32, line_height: f32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            line_height,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        tracing::debug!("📄 Started page {}", self.pages.len());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 單行文字佔用的高度
    pub fn line_advance(&self, size: f32) -> f32 {
        size * self.line_height
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.add_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.current_page().ops.push(DrawOp::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    pub fn text(&mut self, x: f32, y: f32, text: &str, style: &TextStyle) {
        if text.trim().is_empty() {
            return;
        }
        self.current_page().ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
            style: *style,
        });
    }

    /// 在固定寬度內換行繪製，回傳佔用的高度
    pub fn text_block(&mut self, x: f32, y: f32, width: f32, text: &str, style: &TextStyle) -> f32 {
        let advance = self.line_advance(style.size);
        let lines = wrap_text(text, style.face, style.size, width);

        for (index, line) in lines.iter().enumerate() {
            self.text(x, y + index as f32 * advance, line, style);
        }

        lines.len() as f32 * advance
    }

    /// `text_block` 會佔用的高度，不繪製
    pub fn measure_block(&self, width: f32, text: &str, style: &TextStyle) -> f32 {
        wrap_text(text, style.face, style.size, width).len() as f32 * self.line_advance(style.size)
    }

    pub fn finish(self) -> Result<RenderedDocument> {
        if self.pages.is_empty() {
            return Err(MenuPdfError::EmptyDocument);
        }

        Ok(RenderedDocument {
            title: self.title,
            width: self.width,
            height: self.height,
            pages: self.pages,
        })
    }
}

/// 完成後的文件，只供讀取與序列化
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    title: String,
    width: f32,
    height: f32,
    pages: Vec<Page>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn text_runs(&self) -> impl Iterator<Item = TextRun<'_>> {
        self.pages.iter().enumerate().flat_map(|(page, p)| {
            p.ops.iter().filter_map(move |op| match op {
                DrawOp::Text { x, y, text, style } => Some(TextRun {
                    page,
                    x: *x,
                    y: *y,
                    text: text.as_str(),
                    style,
                }),
                DrawOp::FillRect { .. } => None,
            })
        })
    }

    /// 轉成 lopdf 文件；相同輸入永遠產生相同物件
    pub fn to_pdf(&self) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in [FontFace::Regular, FontFace::Bold] {
            fonts.set(
                face.resource_name(),
                dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => face.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                },
            );
        }

        let states = self.graphics_states();
        let mut ext_states = Dictionary::new();
        for (permille, name) in &states {
            let alpha = *permille as f32 / 1000.0;
            ext_states.set(
                name.as_str(),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => alpha,
                    "CA" => alpha,
                },
            );
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "ExtGState" => ext_states,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content = Content {
                operations: self.page_operations(page, &states),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.0_f32.into(), 0.0_f32.into(), self.width.into(), self.height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(&self.title)),
            "Producer" => Object::string_literal("weekly-menu-pdf"),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    /// 每種不透明度對應一個 ExtGState 名稱
    fn graphics_states(&self) -> BTreeMap<u32, String> {
        self.pages
            .iter()
            .flat_map(|page| page.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { style, .. } if style.opacity < 1.0 => Some(opacity_key(style.opacity)),
                _ => None,
            })
            .map(|key| (key, format!("GS{}", key)))
            .collect()
    }

    fn page_operations(&self, page: &Page, states: &BTreeMap<u32, String>) -> Vec<Operation> {
        let mut operations = Vec::new();

        for op in &page.ops {
            match op {
                DrawOp::FillRect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    operations.push(fill_color(color));
                    operations.push(Operation::new(
                        "re",
                        vec![
                            (*x).into(),
                            (self.height - y - height).into(),
                            (*width).into(),
                            (*height).into(),
                        ],
                    ));
                    operations.push(Operation::new("f", vec![]));
                }
                DrawOp::Text { x, y, text, style } => {
                    let state = states.get(&opacity_key(style.opacity)).filter(|_| style.opacity < 1.0);
                    if let Some(name) = state {
                        operations.push(Operation::new("q", vec![]));
                        operations.push(Operation::new("gs", vec![name.as_str().into()]));
                    }

                    let baseline = self.height - (y + style.size * 0.8);
                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new(
                        "Tf",
                        vec![style.face.resource_name().into(), style.size.into()],
                    ));
                    operations.push(fill_color(&style.color));
                    operations.push(Operation::new("Td", vec![(*x).into(), baseline.into()]));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::string_literal(encode_win_ansi(text))],
                    ));
                    operations.push(Operation::new("ET", vec![]));

                    if state.is_some() {
                        operations.push(Operation::new("Q", vec![]));
                    }
                }
            }
        }

        operations
    }
}

fn opacity_key(opacity: f32) -> u32 {
    (opacity.clamp(0.0, 1.0) * 1000.0).round() as u32
}

fn fill_color(color: &Rgb) -> Operation {
    Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()])
}
