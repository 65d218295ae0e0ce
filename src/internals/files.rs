/// Input sources: stdin, or a file opened by `loadf`.
///
/// `loadf` nests — a loaded file can itself call `loadf` — so the
/// runtime keeps a stack of `InputSource`s rather than a single one.
/// Line editing and the interactive stdin stream itself are an
/// external collaborator; what lives here is only the part the core
/// owns: turning a source into one line of text at a time, and the
/// stack discipline `loadf` needs to suspend the caller's stream while
/// a nested one runs.
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::internals::messages::Msg;

#[derive(Debug)]
enum Source {
    Stdin,
    File(BufReader<File>),
}

/// One open input stream, plus enough bookkeeping to report progress
/// through it.
#[derive(Debug)]
pub struct InputSource {
    source: Source,
    name: String,
    line_number: usize,
}

impl InputSource {
    pub fn stdin() -> InputSource {
        InputSource {
            source: Source::Stdin,
            name: "<stdin>".to_string(),
            line_number: 0,
        }
    }

    /// Open `path` for reading. `None` means the file could not be
    /// opened; the caller turns that into the `stream-open` condition.
    pub fn open(path: &Path, msg: &Msg) -> Option<InputSource> {
        match File::open(path) {
            Ok(file) => Some(InputSource {
                source: Source::File(BufReader::new(file)),
                name: path.display().to_string(),
                line_number: 0,
            }),
            Err(e) => {
                msg.error("InputSource::open", "unable to open file", Some(e.to_string()));
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.source, Source::Stdin)
    }

    /// Read the next line, trimming the trailing newline. `None` at
    /// end of stream (or stdin EOF, e.g. ctrl-D).
    pub fn get_line(&mut self) -> Option<String> {
        let mut buf = String::new();
        let read = match &mut self.source {
            Source::Stdin => {
                io::stdout().flush().ok();
                io::stdin().read_line(&mut buf)
            }
            Source::File(reader) => reader.read_line(&mut buf),
        };
        match read {
            Ok(0) => None,
            Ok(_) => {
                self.line_number += 1;
                Some(buf.trim_end_matches(['\n', '\r']).to_string())
            }
            Err(_) => None,
        }
    }
}

/// The stack of nested input sources `loadf` pushes and pops. The
/// bottom of the stack is always whatever the interpreter was started
/// with (stdin, or the lines passed on the command line).
pub struct InputStack {
    sources: Vec<InputSource>,
}

impl InputStack {
    pub fn new(initial: InputSource) -> InputStack {
        InputStack {
            sources: vec![initial],
        }
    }

    pub fn push(&mut self, source: InputSource) {
        self.sources.push(source);
    }

    /// Pop the current source, returning to the caller's stream. Never
    /// pops the last source — `loadf`'s nested stream is always on top
    /// of at least the original one.
    pub fn pop(&mut self) -> Option<InputSource> {
        if self.sources.len() > 1 {
            self.sources.pop()
        } else {
            None
        }
    }

    pub fn current(&mut self) -> &mut InputSource {
        self.sources.last_mut().expect("input stack is never empty")
    }

    pub fn depth(&self) -> usize {
        self.sources.len()
    }

    /// Read the next line from the top of the stack, popping exhausted
    /// nested sources until a line is found or only the base source
    /// remains.
    pub fn get_line(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.current().get_line() {
                return Some(line);
            }
            if self.sources.len() == 1 {
                return None;
            }
            self.sources.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn temp_file(contents: &str) -> tempfile_like::TempPath {
        tempfile_like::write(contents)
    }

    // A tiny local stand-in for a temp-file helper, since the crate
    // doesn't otherwise depend on `tempfile`.
    mod tempfile_like {
        use std::fs;
        use std::io::Write;
        use std::path::PathBuf;

        pub struct TempPath(pub PathBuf);

        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.0);
            }
        }

        pub fn write(contents: &str) -> TempPath {
            let mut path = std::env::temp_dir();
            path.push(format!("z80forth-test-{}-{}.fs", std::process::id(), contents.len()));
            let mut f = fs::File::create(&path).unwrap();
            f.write_all(contents.as_bytes()).unwrap();
            TempPath(path)
        }
    }

    #[test]
    fn open_missing_file_is_none() {
        let msg = Msg::new();
        assert!(InputSource::open(Path::new("/no/such/path.fs"), &msg).is_none());
    }

    #[test]
    fn get_line_reads_file_lines_in_order() {
        let tmp = temp_file("one\ntwo\nthree\n");
        let msg = Msg::new();
        let mut src = InputSource::open(&tmp.0, &msg).unwrap();
        assert_eq!(src.get_line(), Some("one".to_string()));
        assert_eq!(src.get_line(), Some("two".to_string()));
        assert_eq!(src.get_line(), Some("three".to_string()));
        assert_eq!(src.get_line(), None);
    }

    #[test]
    fn input_stack_falls_back_to_base_when_nested_source_exhausts() {
        let nested = temp_file("nested line\n");
        let base = temp_file("base line\n");
        let msg = Msg::new();
        let mut stack = InputStack::new(InputSource::open(&base.0, &msg).unwrap());
        stack.push(InputSource::open(&nested.0, &msg).unwrap());
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.get_line(), Some("nested line".to_string()));
        // nested source is now exhausted; falls through to base.
        assert_eq!(stack.get_line(), Some("base line".to_string()));
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn pop_never_removes_the_last_source() {
        let msg = Msg::new();
        let base = temp_file("x\n");
        let mut stack = InputStack::new(InputSource::open(&base.0, &msg).unwrap());
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
    }
}
