
pub mod ray;
pub mod acceleration;
pub mod bbox;
pub mod config;
pub mod shapes;
pub mod stats;
pub mod numeric;
pub mod sampler;
pub mod tracer;
pub mod interval;
pub mod geometry;
pub mod json_parser;

pub mod prelude;
