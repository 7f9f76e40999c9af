//! Command parsing and execution for the shell.

use crate::app::AppError;
use crate::app::fields::{FIELDS, FieldKind, field_by_key};
use crate::app::render::render;
use crate::app::session::{ModelChoice, Session};

/// A parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show current inputs and the active model
    Show,
    /// Set an input field
    Set { key: String, value: String },
    /// Switch or show the active model
    Model { choice: Option<ModelChoice> },
    /// Score the current inputs with explanations
    Predict,
    /// Restore default inputs
    Reset,
    /// Show help
    Help { topic: Option<String> },
    /// Clear screen
    Clear,
    /// Quit the shell
    Quit,
    /// Unknown command
    Unknown { input: String },
}

/// Parse a command string into a Command.
pub fn parse(input: &str) -> Result<Command, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Command::Unknown {
            input: String::new(),
        });
    }

    let parts: Vec<&str> = input.split_whitespace().collect();
    let cmd = parts[0].to_lowercase();
    let args = &parts[1..];

    match cmd.as_str() {
        "show" | "fields" => Ok(Command::Show),
        "set" => parse_set(args),
        "model" | "use" => parse_model(args),
        "predict" | "run" => Ok(Command::Predict),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help {
            topic: args.first().map(|s| s.to_string()),
        }),
        "clear" | "cls" => Ok(Command::Clear),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Ok(Command::Unknown {
            input: input.to_string(),
        }),
    }
}

fn parse_set(args: &[&str]) -> Result<Command, AppError> {
    if args.len() < 2 {
        return Err(AppError::Usage {
            message: "not enough arguments for 'set'".to_string(),
            suggestion: "Usage: set <field> <value>".to_string(),
        });
    }

    Ok(Command::Set {
        key: args[0].to_string(),
        // Multi-word values like "eco plus".
        value: args[1..].join(" "),
    })
}

fn parse_model(args: &[&str]) -> Result<Command, AppError> {
    let Some(first) = args.first() else {
        return Ok(Command::Model { choice: None });
    };
    match first.to_lowercase().as_str() {
        "boosted" | "forest" => Ok(Command::Model {
            choice: Some(ModelChoice::Boosted),
        }),
        "tree" | "single" => Ok(Command::Model {
            choice: Some(ModelChoice::SingleTree),
        }),
        other => Err(AppError::Usage {
            message: format!("unknown model '{other}'"),
            suggestion: "Available models: boosted, tree".to_string(),
        }),
    }
}

/// Execute a command against the session.
pub fn execute(cmd: &Command, state: &mut Session) -> Result<String, AppError> {
    match cmd {
        Command::Show => Ok(execute_show(state)),
        Command::Set { key, value } => execute_set(key, value, state),
        Command::Model { choice } => Ok(execute_model(*choice, state)),
        Command::Predict => Ok(execute_predict(state)),
        Command::Reset => {
            state.reset();
            Ok("Inputs restored to defaults.".to_string())
        }
        Command::Help { topic } => Ok(help_text(topic.as_deref())),
        Command::Clear => Ok(String::new()),
        Command::Quit => Ok("Goodbye!".to_string()),
        Command::Unknown { input } => {
            if input.is_empty() {
                Ok(String::new())
            } else {
                Err(AppError::Usage {
                    message: format!("unknown command '{input}'"),
                    suggestion: "Type 'help' for available commands".to_string(),
                })
            }
        }
    }
}

fn execute_show(state: &Session) -> String {
    let mut out = format!("Inputs (model: {}):\n", state.active().label());
    for (idx, field) in FIELDS.iter().enumerate() {
        out.push_str(&format!(
            "  {:<13} {:<23} {:<10} {}\n",
            field.key,
            field.name,
            state.record().display_value(idx),
            allowed(&field.kind)
        ));
    }
    out.push_str("Use 'set <field> <value>' to edit, 'predict' to score.");
    out
}

fn execute_set(key: &str, value: &str, state: &mut Session) -> Result<String, AppError> {
    let Some((idx, field)) = field_by_key(key) else {
        return Err(AppError::Usage {
            message: format!("unknown field '{key}'"),
            suggestion: "Type 'show' to list fields".to_string(),
        });
    };
    state.record_mut().set(key, value)?;
    Ok(format!(
        "Set {} = {}",
        field.name,
        state.record().display_value(idx)
    ))
}

fn execute_model(choice: Option<ModelChoice>, state: &mut Session) -> String {
    match choice {
        Some(choice) => {
            state.set_active(choice);
            format!(
                "Active model: {} ('{}')",
                choice.label(),
                state.classifier().meta().name
            )
        }
        None => format!(
            "Active model: {}. Available: boosted, tree",
            state.active().label()
        ),
    }
}

/// Runs a prediction and renders the report. Any failure in the predict
/// path is logged and collapsed into a single support message, so the
/// shell keeps running.
fn execute_predict(state: &mut Session) -> String {
    let rendered = state
        .predict()
        .and_then(|report| render(&report, state.format()));
    match rendered {
        Ok(output) => output,
        Err(err) => {
            log::error!("prediction failed: {err}");
            format!("Error occurred during prediction: {err}. Please contact support.")
        }
    }
}

fn allowed(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Numeric { min, max, .. } => format!("{min} to {max}"),
        FieldKind::Choice { options, .. } => options.join(", "),
    }
}

fn help_text(topic: Option<&str>) -> String {
    match topic {
        Some("set") => format!(
            "set <field> <value>\n  Edit an input field.\n\nFields:\n{}",
            fields_help()
        ),
        Some("model") => "model [boosted|tree]\n  Switch the scoring model, or show the active one.\n  boosted: gradient-boosted forest\n  tree:    single deep tree".to_string(),
        Some("predict") => {
            "predict\n  Score the current inputs with the active model and print the\n  predicted label, per-feature contributions, and a local surrogate fit."
                .to_string()
        }
        _ => "Available commands:
  show                 Show current inputs and the active model
  set <field> <value>  Edit an input field
  model [boosted|tree] Switch or show the active model
  predict              Score the current inputs with explanations
  reset                Restore default inputs
  help [topic]         Show help (topics: set, model, predict)
  clear                Clear screen
  quit                 Exit"
            .to_string(),
    }
}

fn fields_help() -> String {
    let mut out = String::new();
    for field in FIELDS {
        out.push_str(&format!(
            "  {:<13} {:<23} {}\n",
            field.key,
            field.name,
            allowed(&field.kind)
        ));
    }
    out
}
