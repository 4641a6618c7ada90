pub mod completer;
pub mod console;
pub mod formatter;
pub mod input;

pub use console::ConsolePrompter;
pub use formatter::Formatter;
pub use input::{InputError, Prompter};
