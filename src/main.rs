use clap::Parser;
use glint::config::{HELP_TEXT, HISTORY_FILE_NAME, REPL_PROMPT, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use glint::error::GlintError;
use glint::highlighter::GlintHelper;
use glint::interpreter::{self, Interpreter};
use glint::lexer::Lexer;
use glint::parser::Parser as GlintParser;
use glint::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;

/// A small, dynamically-typed, expression-oriented scripting language
#[derive(Parser, Debug)]
#[command(name = "glint")]
#[command(version = glint::config::VERSION)]
#[command(about = "Run a glint script, or start the interactive REPL with no arguments")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Some(script_path) = args.script {
        return run_script(&script_path);
    }

    run_repl();
    ExitCode::SUCCESS
}

fn run_script(path: &PathBuf) -> ExitCode {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Cannot read script file {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let file_name = path.to_string_lossy();
    match interpreter::run(&file_name, &contents) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.render());
            ExitCode::FAILURE
        }
    }
}

/// Lexes and parses one REPL line and runs it through `interpreter`, so
/// globals and `fun`s declared on one line stay visible on the next.
fn eval_line(interpreter: &mut Interpreter, line: &str) -> Result<Value, GlintError> {
    let tokens = Lexer::new("<stdin>", line).tokenize()?;
    let stmts = GlintParser::new(tokens).parse()?;
    interpreter.run(&stmts)
}

fn run_repl() {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<GlintHelper, _> = match Editor::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {e}");
            return;
        }
    };
    rl.set_helper(Some(GlintHelper::new()));

    let _ = rl.load_history(HISTORY_FILE_NAME);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    let mut interpreter = Interpreter::new();

    loop {
        match rl.readline(REPL_PROMPT) {
            Ok(line) => {
                match line.trim() {
                    "" => continue,
                    ":quit" | ":exit" => break,
                    ":help" => {
                        println!("{HELP_TEXT}");
                        continue;
                    }
                    _ => {}
                }
                match eval_line(&mut interpreter, &line) {
                    Ok(Value::Nil) => {}
                    Ok(value) => println!("{value}"),
                    Err(err) => eprintln!("{}", err.render()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE_NAME);
}
