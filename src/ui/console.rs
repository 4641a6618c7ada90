use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use std::io::Write;

use super::completer::MenuHelper;
use super::input::{InputError, Prompter};

/// Terminal-backed [`Prompter`] with line editing and completion.
///
/// History is kept in memory for the lifetime of the session only.
pub struct ConsolePrompter {
    editor: Editor<MenuHelper, FileHistory>,
}

impl ConsolePrompter {
    pub fn new() -> Result<Self, InputError> {
        let mut editor = Editor::<MenuHelper, FileHistory>::new()
            .map_err(|e| InputError::Terminal(format!("Failed to initialize editor: {}", e)))?;
        editor.set_helper(Some(MenuHelper::default()));
        Ok(Self { editor })
    }
}

impl Prompter for ConsolePrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Err(InputError::Interrupted),
            Err(ReadlineError::Eof) => Err(InputError::Eof),
            Err(e) => Err(InputError::Terminal(e.to_string())),
        }
    }

    fn read_password(&mut self, prompt: &str) -> Result<String, InputError> {
        print!("{}", prompt);
        std::io::stdout()
            .flush()
            .map_err(|e| InputError::Terminal(e.to_string()))?;
        rpassword::read_password().map_err(|e| InputError::Terminal(e.to_string()))
    }

    fn set_completions(&mut self, candidates: Vec<(String, String)>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.set_candidates(candidates);
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}
