//! Domain layer - relay vocabulary and rules, free of I/O.

pub mod foundation;
pub mod relay;
