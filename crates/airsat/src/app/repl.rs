//! Interactive shell loop.

use std::path::PathBuf;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::app::commands::{Command, execute, parse};
use crate::app::session::Session;

/// Line-edited shell over a [`Session`].
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Creates the shell and loads readline history if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the line editor cannot be initialized.
    pub fn new(session: Session) -> rustyline::Result<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs::data_dir().map(|p| p.join("airsat").join("history"));

        let mut repl = Self {
            editor,
            session,
            history_path,
        };
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }
        Ok(repl)
    }

    /// Runs the read-eval-print loop until `quit` or Ctrl-D.
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("airsat[{}]> ", self.session.active().label());

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    match parse(line) {
                        Ok(cmd) => {
                            if matches!(cmd, Command::Quit) {
                                self.save_history();
                                println!("Goodbye!");
                                break;
                            }
                            if matches!(cmd, Command::Clear) {
                                print!("\x1B[2J\x1B[1;1H");
                                continue;
                            }

                            match execute(&cmd, &mut self.session) {
                                Ok(output) => {
                                    if !output.is_empty() {
                                        println!("{output}");
                                    }
                                }
                                Err(e) => println!("error: {e}"),
                            }
                        }
                        Err(e) => println!("error: {e}"),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use 'quit' or Ctrl-D to exit");
                }
                Err(ReadlineError::Eof) => {
                    self.save_history();
                    println!("Goodbye!");
                    break;
                }
                Err(e) => {
                    println!("error: {e}");
                }
            }
        }

        Ok(())
    }

    fn print_banner(&self) {
        println!("airsat v{}", env!("CARGO_PKG_VERSION"));
        println!("Flight satisfaction prediction with explainable tree models");
        println!("Type 'help' for commands, 'quit' to exit.\n");
    }

    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}
