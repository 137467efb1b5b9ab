//! Passkey capture.
//!
//! On a terminal the passkey is read in raw mode with echo off; Enter
//! commits, Backspace edits, Ctrl-C or Ctrl-D aborts. Other Ctrl and Alt
//! chords are ignored. Raw mode is held by a guard that restores the
//! terminal on return, on error, and when a panic unwinds. Release builds
//! abort on panic and an external signal kills the process outright; in
//! both cases the terminal is left in raw mode. When stdin is not a
//! terminal a single line is read instead.

use std::io::{self, BufRead, IsTerminal, Write};

use console::style;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use srcvault_core::SecretString;
use thiserror::Error;

/// Passkey capture failures.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted, or stdin closed before a line arrived.
    #[error("Passkey entry aborted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Effect of one key press on the passkey buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Commit,
    Interrupt,
}

/// Raw terminal mode for the lifetime of the guard.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Read the passkey, from the terminal when there is one.
pub fn read_passkey(prompt: &str, from_stdin: bool) -> Result<SecretString, PromptError> {
    let stdin = io::stdin();
    if from_stdin || !stdin.is_terminal() {
        return read_line_from(&mut stdin.lock());
    }
    read_interactive(prompt)
}

/// Read one line as the passkey. The line terminator is not part of it.
pub fn read_line_from(reader: &mut impl BufRead) -> Result<SecretString, PromptError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(PromptError::Interrupted);
    }
    let len = line.trim_end_matches(&['\r', '\n'][..]).len();
    line.truncate(len);
    Ok(SecretString::new(line))
}

/// Apply a key event to the buffer.
pub fn apply_key(buffer: &mut SecretString, key: &KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Commit,
        KeyCode::Char('c') | KeyCode::Char('d')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            KeyOutcome::Interrupt
        }
        KeyCode::Backspace => {
            buffer.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            buffer.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

fn read_interactive(prompt: &str) -> Result<SecretString, PromptError> {
    let mut stderr = io::stderr();
    write!(stderr, "{} ", style(prompt).bold())?;
    stderr.flush()?;

    let outcome = {
        let _guard = RawModeGuard::enable()?;
        let mut buffer = SecretString::for_input();
        loop {
            if let Event::Key(key) = event::read()? {
                match apply_key(&mut buffer, &key) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Commit => break Ok(buffer),
                    KeyOutcome::Interrupt => break Err(PromptError::Interrupted),
                }
            }
        }
    };

    writeln!(stderr)?;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut buffer = SecretString::for_input();
        for c in "passx".chars() {
            assert_eq!(apply_key(&mut buffer, &press(KeyCode::Char(c))), KeyOutcome::Continue);
        }
        apply_key(&mut buffer, &press(KeyCode::Backspace));
        assert_eq!(apply_key(&mut buffer, &press(KeyCode::Enter)), KeyOutcome::Commit);
        assert_eq!(buffer.expose_secret(), "pass");
    }

    #[test]
    fn test_backspace_on_empty_buffer() {
        let mut buffer = SecretString::for_input();
        apply_key(&mut buffer, &press(KeyCode::Backspace));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ctrl_c_and_ctrl_d_interrupt() {
        let mut buffer = SecretString::for_input();
        assert_eq!(apply_key(&mut buffer, &ctrl('c')), KeyOutcome::Interrupt);
        assert_eq!(apply_key(&mut buffer, &ctrl('d')), KeyOutcome::Interrupt);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_control_and_alt_chords_not_recorded() {
        let mut buffer = SecretString::for_input();
        for c in "pass".chars() {
            apply_key(&mut buffer, &press(KeyCode::Char(c)));
        }
        assert_eq!(apply_key(&mut buffer, &ctrl('u')), KeyOutcome::Continue);
        assert_eq!(apply_key(&mut buffer, &ctrl('w')), KeyOutcome::Continue);
        let alt = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT);
        assert_eq!(apply_key(&mut buffer, &alt), KeyOutcome::Continue);
        assert_eq!(buffer.expose_secret(), "pass");
    }

    #[test]
    fn test_shifted_characters_recorded() {
        let mut buffer = SecretString::for_input();
        let upper = KeyEvent::new(KeyCode::Char('P'), KeyModifiers::SHIFT);
        apply_key(&mut buffer, &upper);
        assert_eq!(buffer.expose_secret(), "P");
    }

    #[test]
    fn test_release_events_ignored() {
        let mut buffer = SecretString::for_input();
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;
        apply_key(&mut buffer, &key);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_read_line_strips_terminator() {
        let passkey = read_line_from(&mut Cursor::new("hunter2\r\nignored\n")).unwrap();
        assert_eq!(passkey.expose_secret(), "hunter2");
    }

    #[test]
    fn test_read_line_keeps_inner_whitespace() {
        let passkey = read_line_from(&mut Cursor::new(" two words \n")).unwrap();
        assert_eq!(passkey.expose_secret(), " two words ");
    }

    #[test]
    fn test_read_line_eof_is_interrupt() {
        let result = read_line_from(&mut Cursor::new(""));
        assert!(matches!(result, Err(PromptError::Interrupted)));
    }
}
