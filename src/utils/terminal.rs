//! Terminal utilities for title setting

use std::io::{self, IsTerminal, Write};

pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Sets the terminal title and flushes it; does nothing when stdout is not a terminal
pub fn set_terminal_title(title: &str) -> io::Result<()> {
    if !stdout_is_terminal() {
        return Ok(());
    }
    let mut stdout = io::stdout();
    // ANSI escape sequence to set terminal title
    write!(stdout, "\x1b]0;{title}\x07")?;
    stdout.flush()
}
