//! `fish_indent`: reads a script on stdin, writes the reindented form to
//! stdout. See `original_source/fish_indent.cpp`.

use std::io::{self, Read, Write};
use std::process::ExitCode;

const USAGE: &str = "Usage: fish_indent [-i | --no-indent] [-h | --help] [-v | --version]";

fn main() -> ExitCode {
    let mut do_indent = true;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-i" | "--no-indent" => do_indent = false,
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            "-v" | "--version" => {
                println!("fish_indent, version {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("fish_indent: unrecognized option '{other}'");
                eprintln!("{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("fish_indent: error reading stdin: {e}");
        return ExitCode::FAILURE;
    }

    let output = fish_indent::reindent(&input, do_indent);
    if let Err(e) = io::stdout().write_all(output.as_bytes()) {
        eprintln!("fish_indent: error writing stdout: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
