//! `catjson`: validate JSON text and print it back compact or indented.
//!
//! Usage:
//!   catjson [--pretty] [--indent-width N] [--check] [--max-depth N] [FILE]
//!
//! Reads stdin when FILE is omitted. Log verbosity follows `RUST_LOG`.

use std::io::{self, Write};

use catjson::cli::{self, Args};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let result = cli::read_input(&args).and_then(|text| cli::run(&args, &text));
    match result {
        Ok(Some(out)) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{out}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
