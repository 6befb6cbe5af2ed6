use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;

/// Owns the game screen. Raw mode, the alternate screen, the hidden cursor
/// and keyboard enhancement are undone on drop, so an early return or a
/// panic still hands the user back a working terminal.
pub struct TerminalGuard<W: Write> {
    out: W,
    raw: bool,
    enhanced: bool,
}

impl<W: Write> TerminalGuard<W> {
    pub fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = Self {
            out,
            raw: true,
            enhanced: false,
        };
        guard.out.execute(EnterAlternateScreen)?;
        guard.out.execute(Hide)?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            guard.out.execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
            guard.enhanced = true;
        }
        Ok(guard)
    }

    /// Whether the terminal reports key releases.
    pub fn enhanced(&self) -> bool {
        self.enhanced
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        // Nothing useful can be done with a failure here.
        if self.enhanced {
            let _ = self.out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.out.execute(Show);
        let _ = self.out.execute(LeaveAlternateScreen);
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}
