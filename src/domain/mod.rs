// Domain layer: CloudFront event model, proxy exchange types and ports.

pub mod exchange;
pub mod model;
pub mod ports;
