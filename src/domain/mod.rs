// Domain layer: course records, the grade scale and the ports the pipeline talks through.

pub mod model;
pub mod ports;
pub mod scale;
