//! Observability wiring (tracing, metrics hooks).

mod tracing_init;

pub use tracing_init::init;
