//////////////////////////////////////////////////////////////////
/// runtime.rs
///
/// Ties the memory image, dictionary, compiler and inner interpreter
/// together into a running interpreter: `cold_start` builds the
/// initial dictionary, and `quit` is the outer read-eval-print loop.
use std::collections::VecDeque;

use crate::internals::builtins::{self, Builtin};
use crate::internals::bootstrap;
use crate::internals::compiler::{self, Classified, DefState};
use crate::internals::files::{InputSource, InputStack};
use crate::internals::inner;
use crate::internals::messages::Msg;
use crate::internals::z80::{StubBus, StubRegisters};
use crate::kernel::MemoryImage;

pub struct Runtime {
    pub mem: MemoryImage,
    pub msg: Msg,
    pub input: InputStack,
    pub registers: StubRegisters,
    pub bus: StubBus,
    pub def_state: DefState,
    pub builtins: Vec<Builtin>,
    pub token_queue: VecDeque<String>,
    pub show_stack: bool,
    pub should_exit: bool,
}

impl Runtime {
    /// A bare runtime: a zeroed memory image, no dictionary entries
    /// yet. Most callers want `Runtime::cold()` instead; this is the
    /// seam unit tests use to drive builtins directly without paying
    /// for `cold_start`'s dictionary setup.
    pub fn new() -> Runtime {
        let mut mem = MemoryImage::new();
        mem.cold();
        Runtime {
            mem,
            msg: Msg::new(),
            input: InputStack::new(InputSource::stdin()),
            registers: StubRegisters::new(),
            bus: StubBus::new(),
            def_state: DefState::Idle,
            builtins: builtins::table(),
            token_queue: VecDeque::new(),
            show_stack: false,
            should_exit: false,
        }
    }

    /// Build a runtime with a freshly populated dictionary: every
    /// native primitive registered, then the bootstrap source
    /// interpreted to define the words built out of those primitives.
    pub fn cold_start() -> Runtime {
        let mut rt = Runtime::new();
        builtins::install(&mut rt);
        let bootstrap_source = bootstrap::source();
        for line in bootstrap_source.lines() {
            rt.eval_line(line);
            if rt.mem.is_quitting() {
                panic!("bootstrap source failed: {line}");
            }
        }
        rt
    }

    /// Interpret (or compile, if a definition is open) one line of
    /// source text.
    pub fn eval_line(&mut self, line: &str) {
        let tokens = compiler::tokenize(&mut self.mem, line);
        self.token_queue.extend(tokens);
        while let Some(token) = self.token_queue.pop_front() {
            if self.mem.is_quitting() {
                break;
            }
            self.step(&token);
        }
    }

    fn step(&mut self, token: &str) {
        match self.def_state {
            DefState::Idle => self.interpret_token(token),
            DefState::Defining { .. } => self.compile_token(token),
        }
    }

    fn interpret_token(&mut self, token: &str) {
        if token == ":" {
            let name = self.token_queue.pop_front().unwrap_or_default();
            self.def_state = compiler::begin_definition(&mut self.mem, &name);
            return;
        }
        match compiler::classify(&self.mem, token) {
            Some(Classified::Word(entry)) => inner::execute(self, entry.offset),
            Some(Classified::Literal(v)) => self.mem.push(v),
            None => {
                self.msg.error("", &format!("What is {token}?"), None::<bool>);
                self.mem.set_quitting(true);
            }
        }
    }

    fn compile_token(&mut self, token: &str) {
        if token == ";" {
            self.def_state = compiler::end_definition(&mut self.mem);
            return;
        }
        match compiler::classify(&self.mem, token) {
            Some(classified) => compiler::compile(&mut self.mem, classified),
            None => {
                self.msg.error("", &format!("What is {token}?"), None::<bool>);
                self.def_state = compiler::abort_definition(&mut self.mem, self.def_state);
                self.mem.set_quitting(true);
            }
        }
    }

    /// The outer loop: read a line from the current input source,
    /// evaluate it, print ` ok` on success, and repeat until `bye` or
    /// end of input. Between lines the quitting flag is cleared —
    /// a bad line aborts that line, not the whole session.
    pub fn quit(&mut self) {
        loop {
            if self.should_exit {
                break;
            }
            let line = self.input.get_line();
            match line {
                None => break,
                Some(line) => {
                    self.mem.set_quitting(false);
                    self.eval_line(&line);
                    if !self.mem.is_quitting() {
                        if self.show_stack {
                            print!("({}) ", self.mem.stack_depth());
                        }
                        println!(" ok");
                    }
                    use std::io::Write;
                    std::io::stdout().flush().ok();
                }
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_defines_the_bootstrap_words() {
        let rt = Runtime::cold_start();
        for name in [
            "allot", ",", "C,", "+!", "+1!", "?", "variable", "splitb", "debuglevel", "+", "dup",
        ] {
            assert!(
                crate::internals::dictionary::find(&rt.mem, name).is_some(),
                "missing word {name}"
            );
        }
    }

    #[test]
    fn square_a_number_via_a_user_definition() {
        let mut rt = Runtime::cold_start();
        rt.eval_line(": sq dup * ;");
        assert!(!rt.mem.is_quitting());
        rt.eval_line("7 sq");
        assert_eq!(rt.mem.pop(), Some(49));
    }

    #[test]
    fn variable_store_and_fetch() {
        let mut rt = Runtime::cold_start();
        rt.eval_line("variable v 42 v ! v @");
        assert_eq!(rt.mem.pop(), Some(42));
    }

    #[test]
    fn unrecognized_token_sets_quitting_and_stops_the_line() {
        let mut rt = Runtime::cold_start();
        rt.eval_line("1 nonesuch 2");
        assert!(rt.mem.is_quitting());
        // "2" never ran because the line aborted at the bad token.
        assert_eq!(rt.mem.pop(), Some(1));
    }

    #[test]
    fn quitting_flag_clears_between_lines() {
        let mut rt = Runtime::cold_start();
        rt.eval_line("1 nonesuch");
        assert!(rt.mem.is_quitting());
        rt.mem.set_quitting(false);
        rt.eval_line("2 3 +");
        assert_eq!(rt.mem.pop(), Some(5));
    }

    #[test]
    fn forget_mid_session_removes_a_user_word() {
        let mut rt = Runtime::cold_start();
        rt.eval_line(": sq dup * ;");
        rt.eval_line("forget sq");
        rt.eval_line("7 sq");
        assert!(rt.mem.is_quitting());
    }

    #[test]
    fn bye_sets_should_exit() {
        let mut rt = Runtime::cold_start();
        rt.eval_line("bye");
        assert!(rt.should_exit);
    }
}
