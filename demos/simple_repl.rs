//! Simple REPL (Read-Eval-Print Loop) for Parens
//!
//! Usage: cargo run --example simple_repl
//!
//! A form may span several lines; input is buffered until it reads as
//! complete.

use anyhow::{anyhow, Result};
use parens::{pr_str, read_next, Error, Evaluator};
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    println!("Parens REPL v{}", parens::VERSION);
    println!("Type 'exit' to quit, 'help' for examples, 'tests' for deftest results.");
    println!();

    let mut evaluator = start()?;
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print!("{}", if buffer.is_empty() { "user=> " } else { "  ...> " });
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        if buffer.is_empty() {
            match line.trim() {
                "" => continue,
                "exit" | "quit" => break,
                "help" => {
                    print_help();
                    continue;
                }
                "tests" => {
                    println!("{}", evaluator.session().to_json());
                    continue;
                }
                "clear" => {
                    evaluator = start()?;
                    println!("Environment cleared");
                    continue;
                }
                _ => {}
            }
        }

        buffer.push_str(&line);
        if let Err(err) = eval_buffer(&mut evaluator, &mut buffer) {
            eprintln!("Error: {}", err);
            buffer.clear();
        }
    }

    println!("Goodbye!");
    Ok(())
}

// Interpreter errors hold `Rc` values and cannot cross into `anyhow` directly
fn start() -> Result<Evaluator> {
    Evaluator::new().map_err(|e| anyhow!("starting evaluator: {}", e))
}

/// Evaluates the complete forms at the front of `buffer`, printing each
/// result, and leaves an unfinished trailing form in place
fn eval_buffer(evaluator: &mut Evaluator, buffer: &mut String) -> parens::Result<()> {
    loop {
        let (form, consumed) = match read_next(buffer.as_str()) {
            Ok(Some((form, rest))) => (form, buffer.len() - rest.len()),
            Ok(None) => {
                buffer.clear();
                return Ok(());
            }
            Err(err) if is_incomplete(&err) => return Ok(()),
            Err(err) => return Err(err),
        };
        buffer.drain(..consumed);

        let root = evaluator.env().clone();
        let value = evaluator.eval(form, &root)?;
        println!("{}", pr_str(&value, true));
    }
}

fn is_incomplete(err: &Error) -> bool {
    match err {
        Error::UnexpectedEof => true,
        Error::SyntaxError { message, .. } => {
            message.starts_with("Unbalanced input")
                || message.starts_with("Unterminated")
                || message.starts_with("Expected a form after")
        }
        _ => false,
    }
}

fn print_help() {
    println!("Examples:");
    println!("  (+ 1 2 3)");
    println!("  (defn square [x] (* x x))");
    println!("  (map square (range 5))");
    println!("  (->> [1 2 3 4] (filter even?) (reduce +))");
    println!("  (try (throw {{:code 1}}) (catch e (:code e)))");
    println!("  (deftest arithmetic (is (= 4 (+ 2 2))))");
}
