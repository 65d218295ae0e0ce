/// Leveled, structured diagnostics for the interpreter.
///
/// Every user-visible error or warning the core raises goes through a `Msg`
/// rather than `panic!` or a bare `println!`, so the same channel that prints
/// "Stack underflow" also gates how much the `dbg`/`debuglevel` words let
/// through.

use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Error,
    Warning,
    Info,
    Debug,
}

#[derive(Debug, Clone)]
pub struct Msg {
    level: DebugLevel,
}

impl Msg {
    pub fn new() -> Msg {
        Msg {
            level: DebugLevel::Error,
        }
    }

    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
    }

    pub fn get_level(&self) -> DebugLevel {
        self.level
    }

    /// error is always printed: it accompanies setting the `quitting` flag.
    /// An empty `caller` prints the user message bare, for the spec's
    /// taxonomy messages that have no caller prefix of their own.
    pub fn error<T: Debug>(&self, caller: &str, text: &str, data: Option<T>) {
        match (caller.is_empty(), data) {
            (true, Some(d)) => eprintln!("{text}: {d:?}"),
            (true, None) => eprintln!("{text}"),
            (false, Some(d)) => eprintln!("{caller}: {text}: {d:?}"),
            (false, None) => eprintln!("{caller}: {text}"),
        }
    }

    pub fn warning<T: Debug>(&self, caller: &str, text: &str, data: Option<T>) {
        if self.level >= DebugLevel::Warning {
            match data {
                Some(d) => eprintln!("{caller}: {text}: {d:?}"),
                None => eprintln!("{caller}: {text}"),
            }
        }
    }

    pub fn info<T: Debug>(&self, caller: &str, text: &str, data: Option<T>) {
        if self.level >= DebugLevel::Info {
            match data {
                Some(d) => println!("{caller}: {text}: {d:?}"),
                None => println!("{caller}: {text}"),
            }
        }
    }

    pub fn debug<T: Debug>(&self, caller: &str, text: &str, data: Option<T>) {
        if self.level >= DebugLevel::Debug {
            match data {
                Some(d) => println!("{caller}: {text}: {d:?}"),
                None => println!("{caller}: {text}"),
            }
        }
    }
}

impl Default for Msg {
    fn default() -> Self {
        Msg::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_error() {
        let msg = Msg::new();
        assert_eq!(msg.get_level(), DebugLevel::Error);
    }

    #[test]
    fn set_and_get_level() {
        let mut msg = Msg::new();
        msg.set_level(DebugLevel::Debug);
        assert_eq!(msg.get_level(), DebugLevel::Debug);
    }

    #[test]
    fn level_ordering_gates_visibility() {
        // Warning > Error, so a Warning-level Msg should still consider
        // "warning" visible but not "debug".
        assert!(DebugLevel::Warning > DebugLevel::Error);
        assert!(DebugLevel::Debug > DebugLevel::Info);
    }
}
