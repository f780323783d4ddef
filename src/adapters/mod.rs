// Adapters layer: concrete implementations for external systems.

pub mod webflow;

pub use webflow::WebflowClient;
