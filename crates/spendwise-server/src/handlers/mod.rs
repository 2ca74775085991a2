//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod advice;
pub mod calculate;
pub mod health;
pub mod snapshot;

// Re-export all handlers for use in router
pub use advice::*;
pub use calculate::*;
pub use health::*;
pub use snapshot::*;
