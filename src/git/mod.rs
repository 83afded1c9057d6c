pub mod client;
pub mod operations;

// Re-export commonly used items
pub use client::*;
pub use operations::*;
