pub mod engine;

pub use engine::{Signal, SignalError, compute};
