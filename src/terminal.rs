use std::io;

use crossterm::execute;
use crossterm::terminal::SetSize;

/// Asks the terminal to become `columns` x `rows`.
///
/// Best effort: many terminals ignore the request and a failure changes
/// nothing downstream, so the outcome is only logged.
pub fn resize_terminal(columns: u16, rows: u16) {
    match execute!(io::stdout(), SetSize(columns, rows)) {
        Ok(()) => log::debug!("requested terminal size {columns}x{rows}"),
        Err(err) => log::debug!("terminal resize to {columns}x{rows} ignored: {err}"),
    }
}
