use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    /// Log level used when `RUST_LOG` is not set
    pub fn to_log_level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Trace => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "scui")]
#[command(about = "An interactive console for deployed smart contracts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log output (repeat for more)
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive console for a deployed contract
    Console(ConsoleArgs),

    /// Deploy a contract and print its address
    Deploy(DeployArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Node URL (http://, https://, ws:// or wss://)
    pub node_url: String,

    /// Address of the deployed contract
    pub contract: String,

    /// Path to the contract ABI (JSON)
    pub abi: PathBuf,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Node URL (http://, https://, ws:// or wss://)
    pub node_url: String,

    /// File holding the contract bytecode as hex
    pub bytecode: PathBuf,

    /// Path to the contract ABI (JSON)
    pub abi: PathBuf,

    #[command(flatten)]
    pub signer: SignerArgs,

    #[command(flatten)]
    pub gas: GasArgs,

    /// Constructor arguments, after `--`
    #[arg(last = true, allow_hyphen_values = true, value_name = "CONSTRUCTOR_ARGS")]
    pub constructor_args: Vec<String>,
}

/// How transactions are signed
#[derive(Args, Debug, Clone, Default)]
pub struct SignerArgs {
    /// File holding a raw hex private key
    #[arg(short = 'k', long = "key", value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// Encrypted JSON keystore file
    #[arg(short = 'e', long = "encrypted-key", value_name = "FILE")]
    pub encrypted_key: Option<PathBuf>,

    /// Password for the encrypted key (asked for when omitted)
    #[arg(short = 'P', long = "password")]
    pub password: Option<String>,

    /// Sign with a Ledger hardware wallet
    #[arg(short = 'w', long = "ledger")]
    pub ledger: bool,

    /// Ledger derivation path, `x` marks the account index
    #[arg(short = 'd', long = "derivation-path", value_name = "PATH")]
    pub derivation_path: Option<String>,

    /// Ledger address to use, searched in the first five accounts (default: first account)
    #[arg(short = 'a', long = "ledger-address", value_name = "ADDRESS")]
    pub ledger_address: Option<String>,
}

/// Gas and value overrides, zero means network default
#[derive(Args, Debug, Clone, Default)]
pub struct GasArgs {
    /// Gas price in wei
    #[arg(short = 'p', long = "gas-price", value_name = "WEI", allow_hyphen_values = true)]
    pub gas_price: Option<String>,

    /// Gas limit
    #[arg(short = 'l', long = "gas-limit", value_name = "GAS", allow_hyphen_values = true)]
    pub gas_limit: Option<String>,

    /// Value to send in wei
    #[arg(short = 'v', long = "value", value_name = "WEI", allow_hyphen_values = true)]
    pub value: Option<String>,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
