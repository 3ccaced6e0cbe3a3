//! `fish_pager`: reads candidate completions from `--completion-fd`,
//! displays them in columns, and writes the chosen completion to
//! `--result-fd`. See `original_source/fish_pager.cpp`. Raw terminal
//! rendering and the line-editor UI are out of scope (spec.md Non-goals);
//! this binary prints a plain columnar listing and reads a one-line
//! selection from stdin.

use fish_pager::{choose_layout, flatten, parse_completions};
use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::os::unix::io::FromRawFd;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};

const USAGE: &str = "Usage: fish_pager --completion-fd N --result-fd N [--prefix STR] [--is-quoted]";

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_signum: i32) {
    SIGWINCH_RECEIVED.store(true, Ordering::SeqCst);
}

struct Args {
    completion_fd: Option<i32>,
    result_fd: Option<i32>,
    prefix: String,
    #[allow(dead_code)]
    is_quoted: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args { completion_fd: None, result_fd: None, prefix: String::new(), is_quoted: false };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--completion-fd" => {
                let v = it.next().ok_or("--completion-fd requires a value")?;
                args.completion_fd = Some(v.parse().map_err(|_| "invalid --completion-fd value")?);
            }
            "--result-fd" => {
                let v = it.next().ok_or("--result-fd requires a value")?;
                args.result_fd = Some(v.parse().map_err(|_| "invalid --result-fd value")?);
            }
            "--prefix" => {
                args.prefix = it.next().ok_or("--prefix requires a value")?;
            }
            "--is-quoted" => args.is_quoted = true,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            "--version" | "-v" => {
                println!("fish_pager, version {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other => return Err(format!("unrecognized option '{other}'\n{USAGE}")),
        }
    }
    Ok(args)
}

fn terminal_width() -> usize {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let ok = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if ok == 0 && ws.ws_col > 0 {
        ws.ws_col as usize
    } else {
        80
    }
}

fn print_columns(items: &[&str], prefix: &str, term_width: usize) {
    let layout = choose_layout(items, term_width);
    for row in 0..layout.rows {
        let mut line = String::new();
        for col in 0..layout.columns {
            if let Some(item) = items.get(col * layout.rows + row) {
                let width = layout.column_widths[col];
                line.push_str(prefix);
                line.push_str(item);
                let printed = prefix.chars().count() + item.chars().count();
                for _ in printed..width {
                    line.push(' ');
                }
            }
        }
        println!("{line}");
    }
}

fn run(args: Args) -> io::Result<()> {
    unsafe {
        libc::signal(libc::SIGWINCH, on_sigwinch as usize);
    }

    let completion_fd = args.completion_fd.expect("validated by caller");
    let result_fd = args.result_fd.expect("validated by caller");

    let mut input = String::new();
    unsafe { File::from_raw_fd(completion_fd) }.read_to_string(&mut input)?;
    let groups = parse_completions(&input, '\x1f', '\t');
    let items = flatten(&groups);

    print_columns(&items, &args.prefix, terminal_width());

    let chosen = if items.len() == 1 {
        items[0].to_owned()
    } else {
        print!("select (0-{}): ", items.len().saturating_sub(1));
        io::stdout().flush()?;
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            if SIGWINCH_RECEIVED.swap(false, Ordering::SeqCst) {
                print_columns(&items, &args.prefix, terminal_width());
            }
            line.clear();
            let n = stdin.lock().read_line(&mut line)?;
            if n == 0 {
                return Ok(());
            }
            if let Ok(index) = line.trim().parse::<usize>() {
                if let Some(item) = items.get(index) {
                    break item.to_string();
                }
            }
        }
    };

    let mut result_file = unsafe { File::from_raw_fd(result_fd) };
    result_file.write_all(chosen.as_bytes())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("fish_pager: {message}");
            return ExitCode::FAILURE;
        }
    };
    if args.completion_fd.is_none() || args.result_fd.is_none() {
        eprintln!("fish_pager: --completion-fd and --result-fd are required\n{USAGE}");
        return ExitCode::FAILURE;
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fish_pager: {e}");
            ExitCode::FAILURE
        }
    }
}
