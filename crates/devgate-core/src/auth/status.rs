//! Coarse lifecycle status of the login manager.

use std::fmt;

/// Status moves `Initializing -> LoggingIn -> {LoggedIn | LoggedOut}`;
/// later attempts pass through `LoggingIn` again. `Initializing` is only
/// reachable at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Initializing,
    LoggingIn,
    LoggedIn,
    LoggedOut,
}

impl Status {
    /// Whether an operation is still in flight and waiters should hold out
    /// for a final answer.
    pub fn is_settling(self) -> bool {
        matches!(self, Status::Initializing | Status::LoggingIn)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Initializing => "Initializing",
            Status::LoggingIn => "LoggingIn",
            Status::LoggedIn => "LoggedIn",
            Status::LoggedOut => "LoggedOut",
        };
        f.write_str(name)
    }
}
