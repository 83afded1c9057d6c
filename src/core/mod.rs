// Internal modules - not part of public API
pub(crate) mod cancel;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod executor;
pub(crate) mod fail_fast;
pub(crate) mod progress;
pub(crate) mod registry;
pub(crate) mod reporter;
pub(crate) mod result;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
