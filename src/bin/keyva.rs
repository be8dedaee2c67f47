use std::io::{self, BufRead, Write};

use clap::Parser as ClapParser;
use log::error;

use keyva_lang::Interpreter;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Lexer, parser and interpreter for keyva scripts")]
struct Cli {
    /// Script file to run. Without this, start an interactive REPL.
    file: Option<std::path::PathBuf>,
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();
    let args = Cli::parse();

    match args.file {
        Some(path) => run_script(&path),
        None => run_repl(),
    }
}

fn run_script(path: &std::path::Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("Could not open file '{}': {err}", path.to_string_lossy());
            std::process::exit(1);
        }
    };

    let mut interpreter = Interpreter::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    interpreter.run(&source, &mut out);
}

/// Starts with `if`, `for`, or `def`, skipping leading whitespace — matches
/// the reference REPL's `starts_with_keyword`, which deliberately does not
/// count `while` as a block opener.
fn starts_block(line: &str, keyword: &str) -> bool {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

fn run_repl() {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut buffer = String::new();
    let mut block_depth: i32 = 0;

    println!("Welcome to keyva-lang REPL");

    loop {
        if block_depth > 0 {
            print!("... ");
        } else {
            print!("> ");
        }
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end_matches('\n');

        if line == "exit" || line == "quit" {
            break;
        }

        buffer.push_str(line);
        buffer.push('\n');

        if starts_block(line, "if") {
            block_depth += 1;
        }
        if starts_block(line, "for") {
            block_depth += 1;
        }
        if starts_block(line, "def") {
            block_depth += 1;
        }
        if starts_block(line, "end") {
            block_depth -= 1;
            if block_depth < 0 {
                println!("Error: Unmatched 'end' detected");
                buffer.clear();
                block_depth = 0;
                continue;
            }
        }

        if block_depth == 0 {
            interpreter.run(&buffer, &mut out);
            buffer.clear();
        }
    }
}
