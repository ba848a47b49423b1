// Domain layer: vehicle model, estimate types and the ports the core depends on.

pub mod model;
pub mod ports;
