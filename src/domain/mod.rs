// Domain layer: retrieval model and the fetcher port. Adapters implement the port.

pub mod model;
pub mod ports;
