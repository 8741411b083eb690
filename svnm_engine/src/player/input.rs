//! Terminal input for the player: rustyline when attached to a terminal,
//! plain stdin otherwise.

use std::io::{self, IsTerminal, Write};

use log::{info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Outcome of reading a line from the player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

pub struct InputManager {
    backend: Backend,
}

impl InputManager {
    pub fn new() -> Self {
        let backend = if io::stdin().is_terminal() {
            match DefaultEditor::new() {
                Ok(editor) => {
                    info!("using rustyline-backed input");
                    Backend::Rustyline(editor)
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::Plain(String::new())
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::Plain(String::new())
        };
        Self { backend }
    }

    /// Read a line. If rustyline reports an unrecoverable error, switch to
    /// plain stdin and retry once.
    ///
    /// # Errors
    /// Returns the I/O error of the plain backend.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Ok(event) => Ok(event),
            Err(err) if matches!(self.backend, Backend::Rustyline(_)) => {
                warn!("rustyline input failed: {err} -- switching to basic stdin");
                self.backend = Backend::Plain(String::new());
                self.backend.read_line(prompt)
            },
            Err(err) => Err(err),
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

enum Backend {
    Rustyline(DefaultEditor),
    Plain(String),
}

impl Backend {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty()
                        && let Err(err) = editor.add_history_entry(line.as_str())
                    {
                        warn!("failed to append to history: {err}");
                    }
                    Ok(InputEvent::Line(line))
                },
                Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
                Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
                Err(ReadlineError::Io(err)) => Err(err),
                Err(other) => Err(io::Error::other(other)),
            },
            Backend::Plain(buffer) => {
                print!("{prompt}");
                io::stdout().flush()?;

                buffer.clear();
                if io::stdin().read_line(buffer)? == 0 {
                    return Ok(InputEvent::Eof);
                }
                let line = buffer.trim_end_matches(['\n', '\r']);
                Ok(InputEvent::Line(line.to_string()))
            },
        }
    }
}
