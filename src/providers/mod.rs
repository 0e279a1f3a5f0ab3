//! Providers Module - External Data Sources
//!
//! Transport to the remote analysis service.

pub mod backend;

pub use backend::*;
