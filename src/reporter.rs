use std::cell::RefCell;
use std::fmt;

use crate::lexer::token::Location;

/// The stage an error was reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "Parse Error"),
            Stage::Runtime => write!(f, "Runtime Error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub stage: Stage,
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [Line {}]: {}", self.stage, self.location.row, self.message)
    }
}

// The interpreter is single-threaded, so the store is thread-local. Tests
// running in parallel each get their own sink.
thread_local! {
    static ERRORS: RefCell<Vec<Diagnostic>> = const { RefCell::new(Vec::new()) };
}

/// Append a new error to the store.
pub fn error(stage: Stage, location: Location, message: impl Into<String>) {
    ERRORS.with(|errors| {
        errors.borrow_mut().push(Diagnostic {
            stage,
            location,
            message: message.into(),
        });
    });
}

/// Check if there are errors.
pub fn has_errors() -> bool {
    ERRORS.with(|errors| !errors.borrow().is_empty())
}

/// Rendered form of every stored error.
pub fn errors() -> Vec<String> {
    ERRORS.with(|errors| errors.borrow().iter().map(|e| e.to_string()).collect())
}

/// Clear the store.
pub fn clear() {
    ERRORS.with(|errors| errors.borrow_mut().clear());
}
