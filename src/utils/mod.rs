pub(crate) mod terminal;

// Public API - utilities used by the binary
pub use terminal::{set_terminal_title, stdout_is_terminal};
