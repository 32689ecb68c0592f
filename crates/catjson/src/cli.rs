//! Logic behind the `catjson` binary: validate JSON text and print it back
//! compact or indented.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::{debug, info};

use crate::encoder::encode_tree;
use crate::error::JsonError;
use crate::options::{DecodeOptions, EncodeOptions};

#[derive(Debug, Parser)]
#[command(
    name = "catjson",
    version,
    about = "Validate JSON text and print it compact or indented",
    long_about = None
)]
pub struct Args {
    #[arg(help = "Input file (default: stdin)")]
    pub input: Option<PathBuf>,
    #[arg(long, help = "Indent the output")]
    pub pretty: bool,
    #[arg(long, default_value_t = 2, help = "Spaces per indent level with --pretty")]
    pub indent_width: usize,
    #[arg(long, help = "Only validate; print nothing on success")]
    pub check: bool,
    #[arg(long, default_value_t = 128, help = "Maximum nesting depth")]
    pub max_depth: usize,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] JsonError),
}

/// Read the input named by `args`, or stdin.
pub fn read_input(args: &Args) -> Result<String, CliError> {
    match &args.input {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buf)
        }
    }
}

/// Parse `text` and return the text to print; `None` with `--check`.
pub fn run(args: &Args, text: &str) -> Result<Option<String>, CliError> {
    let decode = DecodeOptions {
        max_depth: args.max_depth,
        ..Default::default()
    };
    let value = crate::parse_with(text, &decode)?;
    debug!(kind = value.kind_name(), bytes = text.len(), "parsed input");
    if args.check {
        info!("input is valid JSON");
        return Ok(None);
    }
    let encode = EncodeOptions {
        indent: args.pretty,
        indent_width: args.indent_width,
    };
    Ok(Some(encode_tree(&value, &encode)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("catjson").chain(extra.iter().copied()))
    }

    #[test]
    fn compacts_by_default() {
        let out = run(&args(&[]), "{ \"b\" : [ 1 , 2 ] , \"a\" : null }").unwrap();
        assert_eq!(out.as_deref(), Some(r#"{"b":[1,2],"a":null}"#));
    }

    #[test]
    fn pretty_uses_indent_width() {
        let out = run(&args(&["--pretty", "--indent-width", "4"]), "[1]").unwrap();
        assert_eq!(out.as_deref(), Some("[\n    1\n]"));
    }

    #[test]
    fn check_prints_nothing() {
        assert_eq!(run(&args(&["--check"]), "true").unwrap(), None);
        assert!(matches!(
            run(&args(&["--check"]), "[1,]"),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn max_depth_is_configurable() {
        assert!(run(&args(&["--max-depth", "1"]), "[[1]]").is_err());
        assert!(run(&args(&["--max-depth", "2"]), "[[1]]").is_ok());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_input(&args(&["/definitely/not/here.json"])).unwrap_err();
        assert!(err.to_string().starts_with("/definitely/not/here.json: "));
    }
}
