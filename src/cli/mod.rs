pub mod args;
pub mod commands;
pub mod signer_args;

pub use args::{
    Cli, Commands, CompletionsArgs, ConsoleArgs, DeployArgs, GasArgs, SignerArgs, Verbosity,
};
pub use commands::StartupError;
pub use signer_args::{GasSettings, SignerArgsError, SignerSource};
