//! Utils Module - Helper Functions & Shared Utilities

pub mod address;
pub mod constants;
pub mod telemetry;

pub use address::*;
pub use telemetry::*;
