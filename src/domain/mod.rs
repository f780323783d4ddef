// Domain layer: CMS records, menu view-models and ports.

pub mod model;
pub mod ports;
