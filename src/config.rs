// ABOUTME: Version, banner, and REPL constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "glint interpreter";
pub const WELCOME_SUBTITLE: &str = "A small, dynamically-typed, expression-oriented scripting language";

pub const REPL_PROMPT: &str = "> ";

pub const HISTORY_FILE_NAME: &str = ".glint_history";

pub const HELP_TEXT: &str = r#"
Available commands:
  :quit or :exit       - Exit the REPL
  :help                - Show this help message

Type any statement or expression followed by ';' to evaluate it.
Use Ctrl-D to exit.
"#;
