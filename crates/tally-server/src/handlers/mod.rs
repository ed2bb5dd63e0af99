//! HTTP request handlers organized by page
//!
//! Each submodule contains handlers for one area of the site.

pub mod auth;
pub mod dashboard;
pub mod expenses;
pub mod profile;

// Re-export all handlers for use in router
pub use auth::*;
pub use dashboard::*;
pub use expenses::*;
pub use profile::*;
