pub mod cli;
pub mod client;
pub mod config;
pub mod inspector;
pub mod logging;
pub mod repl;
pub mod schema;
pub mod signer;
pub mod ui;
pub mod utils;

use miette::Diagnostic;

use crate::client::ClientError;
use crate::repl::tree::MenuError;
use crate::schema::SchemaError;
use crate::signer::SignerError;
use crate::ui::input::InputError;
use crate::utils::arguments::{CodecError, CollectError};

pub use repl::executor::Dispatcher;
pub use schema::InterfaceSchema;

/// Result type alias for the console
pub type Result<T> = miette::Result<T>;

/// Errors raised while handling one console command.
///
/// None of these end the session; they are reported and the console returns
/// to the prompt with its state unchanged.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConsoleError {
    #[error("method {0} is not constant")]
    #[diagnostic(
        code(scui::not_constant),
        help("State-changing methods are under `transact`.")
    )]
    NotConstant(String),

    #[error("method {0} is constant")]
    #[diagnostic(
        code(scui::constant),
        help("Read-only methods are called without a transaction under `constant`.")
    )]
    Constant(String),

    #[error("signer not configured")]
    #[diagnostic(
        code(scui::signer_not_configured),
        help("Configure one with `signer/key` or `signer/ledger`.")
    )]
    SignerNotConfigured,

    #[error("unknown method: {0}")]
    #[diagnostic(code(scui::unknown_method))]
    UnknownMethod(String),

    #[error("unknown event: {0}")]
    #[diagnostic(code(scui::unknown_event))]
    UnknownEvent(String),

    #[error("undefined command: {0}")]
    #[diagnostic(code(scui::undefined_command))]
    UndefinedCommand(String),

    #[error(transparent)]
    #[diagnostic(code(scui::input))]
    Input(#[from] InputError),

    #[error(transparent)]
    #[diagnostic(
        code(scui::codec),
        help("Strings, addresses and bytes are typed as-is; integers as decimal or 0x hex; bools, arrays and tuples as JSON.")
    )]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(code(scui::signer))]
    Signer(#[from] SignerError),

    #[error(transparent)]
    #[diagnostic(code(scui::network))]
    Network(#[from] ClientError),

    #[error(transparent)]
    #[diagnostic(code(scui::menu))]
    Menu(#[from] MenuError),

    #[error(transparent)]
    #[diagnostic(code(scui::schema))]
    Schema(#[from] SchemaError),
}

impl ConsoleError {
    /// Whether the operator cancelled a prompt.
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            ConsoleError::Input(InputError::Aborted)
                | ConsoleError::Signer(SignerError::Input(InputError::Aborted))
        )
    }

    /// Whether the terminal reached end of input.
    pub fn is_eof(&self) -> bool {
        matches!(
            self,
            ConsoleError::Input(InputError::Eof)
                | ConsoleError::Signer(SignerError::Input(InputError::Eof))
        )
    }
}

impl From<CollectError> for ConsoleError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::Input(e) => ConsoleError::Input(e),
            CollectError::Codec(e) => ConsoleError::Codec(e),
        }
    }
}
