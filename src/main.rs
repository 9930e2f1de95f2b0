use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Result;
use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use aria::interpreter::scope::Scope;
use aria::interpreter::value::Value;
use aria::interpreter::Interpreter;
use aria::lexer::Lexer;
use aria::parser::Parser;
use aria::reader::Reader;
use aria::reporter;

const BANNER: &str = r#"    _   ___ ___   _
   /_\ | _ \_ _| /_\
  / _ \|   /| | / _ \
 /_/ \_\_|_\___/_/ \_\
"#;

#[derive(ClapParser)]
#[command(name = "aria")]
#[command(about = "An expressive, noiseless, interpreted toy language")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an Aria source file
    Run {
        /// Source file to run
        file: PathBuf,
    },
    /// Start the interactive repl
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run { file } => run_file(&file),
        Command::Repl => repl().map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

// Lex, parse and evaluate a file, draining the reporter between the
// phases. Any diagnostic makes the run a failure.
fn run_file(file: &Path) -> Result<bool> {
    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(_) => {
            println!("{}", format!("Couldn't read '{}'", file.display()).red());
            return Ok(false);
        }
    };

    reporter::clear();

    let lexer = Lexer::new(Reader::new(&source));
    if reporter::has_errors() {
        print_errors();
        return Ok(false);
    }

    let mut parser = Parser::new(lexer);
    let program = parser.parse();
    if reporter::has_errors() {
        print_errors();
        return Ok(false);
    }

    let mut interpreter = Interpreter::new();
    interpreter.interpret(&program, &Scope::new());
    if reporter::has_errors() {
        print_errors();
        return Ok(false);
    }

    Ok(true)
}

fn repl() -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    let history_path = dirs::home_dir().map(|p| p.join(".aria_history"));
    if let Some(ref path) = history_path {
        let _ = editor.load_history(path);
    }

    println!("{}", BANNER.yellow());
    println!("{}", "Close by pressing CTRL+C".white());
    println!();

    // One interpreter and one scope live for the whole session, so
    // bindings and modules carry over between lines.
    let mut interpreter = Interpreter::new();
    let scope = Scope::new();

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let _ = editor.add_history_entry(line.as_str());
                run_line(&line, &mut interpreter, &scope);
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(error) => {
                eprintln!("Error: {}", error);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = editor.save_history(path);
    }

    Ok(())
}

fn run_line(line: &str, interpreter: &mut Interpreter, scope: &Rc<Scope>) {
    reporter::clear();

    let mut parser = Parser::new(Lexer::new(Reader::new(line)));
    let program = parser.parse();
    if reporter::has_errors() {
        print_errors();
        return;
    }

    let result = interpreter.interpret(&program, scope);
    if reporter::has_errors() {
        print_errors();
        return;
    }

    // Print the inspected form of every non-nil result.
    if let Some(value) = result {
        if !matches!(value, Value::Nil) {
            println!("{}", value.inspect());
        }
    }
}

fn print_errors() {
    println!("{}", "Oops, found some errors:".white());
    for error in reporter::errors() {
        println!("{}", error.red());
    }
    reporter::clear();
}
