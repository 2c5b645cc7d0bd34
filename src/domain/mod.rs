// Domain layer: records, scoring weights and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod scoring;
