// z80forth main program

mod config;
mod internals;
mod kernel;
mod runtime;

use config::Config;
use internals::files::InputSource;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut config = Config::new();
    config.process_args();

    if !config.run {
        return ExitCode::SUCCESS;
    }

    let mut rt = runtime::Runtime::cold_start();
    rt.msg.set_level(config.debug_level);
    rt.show_stack = config.show_stack;

    if let Some(path) = &config.load_file {
        match InputSource::open(Path::new(path), &rt.msg) {
            Some(source) => rt.input.push(source),
            None => return ExitCode::FAILURE,
        }
    }

    if !config.lines.is_empty() {
        for line in &config.lines {
            rt.eval_line(line);
            if rt.mem.is_quitting() {
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    rt.quit();
    ExitCode::SUCCESS
}
