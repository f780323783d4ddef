pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod layout;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::WebflowClient;
pub use config::AppConfig;
pub use crate::core::{
    generate, handle_request, FunctionResponse, MenuEngine, MenuPdfPipeline, PdfPayload,
};
pub use utils::error::{MenuPdfError, Result};
