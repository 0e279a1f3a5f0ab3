//! Core Module - Analysis protocol & session state
//!
//! Reply parsing, the polling client, the single-result session and the
//! read-only projections the pages render from.

pub mod client;
pub mod response;
pub mod session;
pub mod views;

pub use client::*;
pub use response::*;
pub use session::*;
pub use views::*;
