//! Interactive input primitives.
//!
//! Every prompt goes through a [`Prompter`], so the console, the signer
//! configuration commands and the dispatcher can be driven by a real terminal
//! or by scripted input in tests. Prompts that offer a default show it in
//! parentheses and accept empty input as that default; `..` aborts.

use alloy::primitives::U256;
use std::str::FromStr;
use thiserror::Error;

use super::formatter::{print_info, print_warning, Formatter};

/// Input that aborts the current prompt sequence.
pub const ABORT_INPUT: &str = "..";

/// Input that lists the available choices of a multi-choice prompt.
pub const HELP_INPUT: &str = "help";

#[derive(Debug, Error)]
pub enum InputError {
    /// The operator declined or cancelled a prompt.
    #[error("aborted")]
    Aborted,

    #[error("interrupted")]
    Interrupted,

    #[error("end of input")]
    Eof,

    #[error("terminal error: {0}")]
    Terminal(String),
}

/// Source of operator input.
pub trait Prompter {
    /// Read one line of input after showing `prompt`.
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;

    /// Read a secret without echoing it.
    fn read_password(&mut self, prompt: &str) -> Result<String, InputError>;

    /// Replace the completion candidates offered for the next reads.
    fn set_completions(&mut self, _candidates: Vec<(String, String)>) {}

    /// Record a line in the session history.
    fn add_history(&mut self, _line: &str) {}
}

/// Read free text. Completion is disabled while reading.
pub fn input_text(prompter: &mut dyn Prompter, prompt: &str) -> Result<String, InputError> {
    prompter.set_completions(Vec::new());
    prompter.read_line(prompt)
}

/// Offer a fixed set of choices and return the selected one.
///
/// `prompt` should contain the default, e.g. `"wallet (ledger://0): "`.
pub fn input_multi_choice(
    prompter: &mut dyn Prompter,
    prompt: &str,
    default: &str,
    choices: &[String],
    help: &str,
) -> Result<String, InputError> {
    let mut candidates: Vec<(String, String)> =
        choices.iter().map(|c| (c.clone(), String::new())).collect();
    candidates.push((ABORT_INPUT.to_string(), "abort".to_string()));
    candidates.push((HELP_INPUT.to_string(), "list the choices".to_string()));

    loop {
        prompter.set_completions(candidates.clone());
        let input = prompter.read_line(prompt)?;
        match input.trim() {
            "" => return Ok(default.to_string()),
            ABORT_INPUT => {
                print_warning("aborted");
                return Err(InputError::Aborted);
            }
            HELP_INPUT => {
                print_info(help);
                println!(
                    "{}",
                    Formatter::format_listing(choices.iter().map(|c| (c.as_str(), "")))
                );
            }
            choice => {
                if let Some(found) = choices.iter().find(|c| c.as_str() == choice) {
                    return Ok(found.clone());
                }
                print_warning(format!("invalid choice: {}", choice));
            }
        }
    }
}

/// Ask a yes/no question. `prompt` should contain the default.
pub fn input_yes_no(
    prompter: &mut dyn Prompter,
    prompt: &str,
    default: bool,
) -> Result<bool, InputError> {
    let choices = ["no".to_string(), "yes".to_string()];
    let default = if default { "yes" } else { "no" };
    let answer = input_multi_choice(prompter, prompt, default, &choices, "choose yes or no")?;
    Ok(answer == "yes")
}

/// Read a number, using `default` on empty input.
pub fn input_number_with_default<T>(
    prompter: &mut dyn Prompter,
    prompt: &str,
    default: T,
) -> Result<T, InputError>
where
    T: FromStr + Copy,
    T::Err: std::fmt::Display,
{
    loop {
        let input = input_text(prompter, prompt)?;
        match input.trim() {
            "" => return Ok(default),
            ABORT_INPUT => {
                print_warning("aborted");
                return Err(InputError::Aborted);
            }
            value => match value.parse::<T>() {
                Ok(n) => return Ok(n),
                Err(e) => print_warning(format!("{:?} is not a number: {}", value, e)),
            },
        }
    }
}

/// Read a 256-bit amount. Empty input re-prompts.
pub fn input_u256(prompter: &mut dyn Prompter, prompt: &str) -> Result<U256, InputError> {
    loop {
        let input = input_text(prompter, prompt)?;
        match input.trim() {
            "" => continue,
            ABORT_INPUT => {
                print_warning("aborted");
                return Err(InputError::Aborted);
            }
            value => match U256::from_str(value) {
                Ok(n) => return Ok(n),
                Err(e) => print_warning(format!("{:?} is not a number: {}", value, e)),
            },
        }
    }
}
