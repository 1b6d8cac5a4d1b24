use std::io::{self, Write};
use std::process::ExitCode;
use std::{env, fs};

use anyhow::{Result, anyhow};

use minipy::interpreter::Interpreter;
use minipy::{lexer, parser};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program_name = args.first().map_or("minipy", String::as_str);
        eprintln!("Usage: {program_name} <source_file>");
        return ExitCode::FAILURE;
    }

    match run(&args[1]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<()> {
    let raw = fs::read_to_string(path).map_err(|_| anyhow!("Cannot open file {path}"))?;
    let source = normalize_line_endings(&raw);

    let tokens = lexer::tokenize(&source)?;
    let program = parser::parse_tokens(tokens)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    Interpreter::new().run(&program, &mut out)?;
    out.flush()?;
    Ok(())
}

/// The only transformation the reader performs: `\r\n` and lone `\r` both
/// become `\n` before tokenization.
fn normalize_line_endings(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::normalize_line_endings;

    #[test]
    fn accepts_all_three_line_terminators() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
