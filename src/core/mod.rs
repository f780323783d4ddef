pub mod engine;
pub mod joiner;
pub mod pipeline;
pub mod transport;

pub use crate::domain::model::{MenuData, Record};
pub use crate::domain::ports::{CollectionReader, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use engine::{generate, handle_request, MenuEngine};
pub use pipeline::MenuPdfPipeline;
pub use transport::{FunctionResponse, PdfPayload, SerializationStrategy};
