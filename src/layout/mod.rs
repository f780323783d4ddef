// Layout layer: fonts, drawing surface, page cursor and the menu sections.

pub mod assembler;
pub mod canvas;
pub mod cursor;
pub mod metrics;
pub mod sections;

pub use assembler::DocumentAssembler;
pub use canvas::{Canvas, RenderedDocument, Rgb, TextStyle};
pub use cursor::PageCursor;
pub use metrics::FontFace;
