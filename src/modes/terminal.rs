use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use tracing::warn;

pub type TuiTerminal = Terminal<CrosstermBackend<Stderr>>;

/// Raw mode plus alternate screen for as long as this value lives
///
/// Dropping it puts the terminal back, whichever way the game loop exits.
pub struct TerminalSession {
    terminal: TuiTerminal,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        match Self::open() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = execute!(stderr(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(err)
            }
        }
    }

    fn open() -> Result<TuiTerminal> {
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;
        Ok(terminal)
    }

    pub fn terminal(&mut self) -> &mut TuiTerminal {
        &mut self.terminal
    }

    fn restore(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(error = ?err, "terminal restore failed");
        }
    }
}
