// Domain layer: the result model and the probe port. No backend clients here.

pub mod model;
pub mod ports;
