// system configuration and command line processing

use ::clap::{arg, Command};
use crate::internals::messages::DebugLevel;

pub const VERSION: &str = "0.1.0";

pub struct Config {
    pub debug_level: DebugLevel,
    pub load_file: Option<String>,
    pub lines: Vec<String>,
    pub show_stack: bool,
    pub run: bool,
}

impl Config {
    pub fn new() -> Config {
        Config {
            debug_level: DebugLevel::Error,
            load_file: None,
            lines: Vec::new(),
            show_stack: false,
            run: true,
        }
    }

    /// process_args handles command line argument processing using the clap library
    ///
    /// Anything after the recognized flags is taken as source lines to
    /// run non-interactively, one argument per line, in the order
    /// given — useful for scripting and for tests.
    pub fn process_args(&mut self) -> &Config {
        let arguments = Command::new("z80forth")
            .version(VERSION)
            .about("An interactive Forth-lineage interpreter")
            .arg(
                arg!(--debuglevel <VALUE>)
                    .required(false)
                    .value_parser(["error", "warning", "info", "debug"]),
            )
            .arg(arg!(-f --file <VALUE>).required(false))
            .arg(arg!(-s - -showstack).required(false))
            .arg(arg!([LINES] ... "source lines to run instead of an interactive prompt"))
            .get_matches();

        if let Some(level) = arguments.get_one::<String>("debuglevel") {
            self.debug_level = match level.as_str() {
                "debug" => DebugLevel::Debug,
                "info" => DebugLevel::Info,
                "warning" => DebugLevel::Warning,
                _ => DebugLevel::Error,
            };
        }

        if let Some(file) = arguments.get_one::<String>("file") {
            self.load_file = Some(file.clone());
        }

        if arguments.get_flag("showstack") {
            self.show_stack = true;
        }

        if let Some(lines) = arguments.get_many::<String>("LINES") {
            self.lines = lines.cloned().collect();
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}
