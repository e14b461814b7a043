pub mod commands;
pub mod render;
pub mod terminal;
pub mod welcome;

#[cfg(test)]
mod terminal_test;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UIError {
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("Input interrupted")]
    Interrupted,
    #[error("Input closed")]
    Eof,
}
