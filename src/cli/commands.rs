use alloy::dyn_abi::JsonAbiExt;
use alloy::primitives::{Address, Bytes, TxHash, TxKind};
use clap::CommandFactory;
use miette::Diagnostic;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::args::{Cli, CompletionsArgs, ConsoleArgs, DeployArgs};
use super::signer_args::{GasSettings, SignerArgsError, SignerSource};
use crate::client::{ClientError, NetworkClient, NodeClient};
use crate::config::Config;
use crate::logging;
use crate::repl::{start_repl, ReplConfig};
use crate::schema::{InterfaceSchema, SchemaError};
use crate::signer::hardware::default_hub;
use crate::signer::SignerHandle;
use crate::utils::arguments::{encode, param_type};

/// Fatal errors before or around the console session, each with its own
/// process exit code.
#[derive(Debug, Error, Diagnostic)]
pub enum StartupError {
    #[error("{0}")]
    #[diagnostic(code(scui::startup::signer))]
    Signer(#[from] SignerArgsError),

    #[error("can't read {path}: {reason}")]
    #[diagnostic(code(scui::startup::read))]
    FileRead { path: String, reason: String },

    #[error("{0}")]
    #[diagnostic(code(scui::startup::parse))]
    Parse(String),

    #[error("constructor takes {expected} arguments, got {actual}")]
    #[diagnostic(
        code(scui::startup::argument_count),
        help("Pass constructor arguments after `--`.")
    )]
    ArgumentCount { expected: usize, actual: usize },

    #[error("{0}")]
    #[diagnostic(code(scui::startup::dial))]
    Dial(ClientError),

    #[error("can't fetch chain id: {0}")]
    #[diagnostic(code(scui::startup::chain_id))]
    ChainId(ClientError),

    #[error("deploy failed: {0}")]
    #[diagnostic(code(scui::startup::deploy))]
    Deploy(String),

    #[error("console failed: {0}")]
    #[diagnostic(code(scui::startup::session))]
    Session(String),
}

impl StartupError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Signer(_) => -2,
            StartupError::FileRead { .. } => -3,
            StartupError::Parse(_) => -4,
            StartupError::ArgumentCount { .. } => -5,
            StartupError::Dial(_) => -6,
            StartupError::ChainId(_) => -7,
            StartupError::Deploy(_) => -8,
            StartupError::Session(_) => -9,
        }
    }
}

impl From<SchemaError> for StartupError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Read { path, reason } => StartupError::FileRead { path, reason },
            SchemaError::Parse(reason) => {
                StartupError::Parse(format!("can't parse abi: {}", reason))
            }
        }
    }
}

fn load_schema(path: &Path) -> Result<InterfaceSchema, StartupError> {
    logging::log_loading_abi(&path.to_string_lossy());
    let schema = InterfaceSchema::load(path)?;
    logging::log_abi_loaded(schema.methods().len(), schema.events().len());
    Ok(schema)
}

async fn dial(url: &str) -> Result<NodeClient, StartupError> {
    logging::log_dialing(url);
    NodeClient::connect(url).await.map_err(StartupError::Dial)
}

/// Execute the console command
pub async fn console(args: ConsoleArgs, config: &Config) -> Result<(), StartupError> {
    let schema = load_schema(&args.abi)?;
    let address = Address::from_str(args.contract.trim())
        .map_err(|_| StartupError::Parse(format!("invalid contract address: {}", args.contract)))?;
    let source = args.signer.source(config.signer.derivation_path())?;

    let client = dial(&args.node_url).await?;
    let signer = source.resolve(default_hub().as_ref()).await?;
    if let Some(from) = signer.address() {
        logging::log_signer_configured(&format!("{:?}", signer.kind()), &from.to_string());
    }

    start_repl(ReplConfig {
        client: Arc::new(client),
        schema,
        address,
        signer,
        settings: config.signer.clone(),
    })
    .await
    .map_err(|e| StartupError::Session(e.to_string()))
}

/// Execute the deploy command
pub async fn deploy(args: DeployArgs, config: &Config) -> Result<(), StartupError> {
    let source = args.signer.source(config.signer.derivation_path())?;
    if source == SignerSource::None {
        return Err(SignerArgsError::Missing.into());
    }
    let gas = args.gas.settings()?;

    let bytecode = std::fs::read_to_string(&args.bytecode).map_err(|e| StartupError::FileRead {
        path: args.bytecode.display().to_string(),
        reason: e.to_string(),
    })?;
    let schema = load_schema(&args.abi)?;
    let data = prepare_deployment(&bytecode, &schema, &args.constructor_args)?;

    let client = dial(&args.node_url).await?;
    let chain_id = client.chain_id().await.map_err(StartupError::ChainId)?;
    logging::log_connected(chain_id);

    let mut signer = source.resolve(default_hub().as_ref()).await?;
    let deployed = send_deployment(&client, &signer, chain_id, data, gas).await;
    signer.close().await;

    let (address, hash) = deployed?;
    logging::log_deployed(&address.to_string(), &hash.to_string());
    println!("contract deployed to address {}", address);
    println!("txid: {}", hash);
    Ok(())
}

/// Creation payload: the bytecode followed by the encoded constructor arguments.
pub fn prepare_deployment(
    bytecode: &str,
    schema: &InterfaceSchema,
    arguments: &[String],
) -> Result<Bytes, StartupError> {
    let text = bytecode.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    let mut data =
        hex::decode(text).map_err(|e| StartupError::Parse(format!("invalid bytecode: {}", e)))?;

    let inputs = schema.constructor().map(|c| c.inputs.as_slice()).unwrap_or_default();
    if inputs.len() != arguments.len() {
        return Err(StartupError::ArgumentCount {
            expected: inputs.len(),
            actual: arguments.len(),
        });
    }

    if let Some(constructor) = schema.constructor() {
        let values = inputs
            .iter()
            .zip(arguments)
            .map(|(param, text)| {
                let ty = param_type(param)?;
                encode(text, &ty)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StartupError::Parse(format!("invalid constructor argument: {}", e)))?;
        let encoded = constructor.abi_encode_input(&values).map_err(|e| {
            StartupError::Parse(format!("can't encode constructor arguments: {}", e))
        })?;
        data.extend_from_slice(&encoded);
    }

    Ok(data.into())
}

/// Sign and submit a creation transaction, returning the new contract address.
pub async fn send_deployment(
    client: &dyn NetworkClient,
    signer: &SignerHandle,
    chain_id: u64,
    data: Bytes,
    gas: GasSettings,
) -> Result<(Address, TxHash), StartupError> {
    let mut options = signer
        .transact_options(chain_id)
        .map_err(|_| StartupError::Signer(SignerArgsError::Missing))?;
    options.gas_price = gas.gas_price;
    options.gas_limit = gas.gas_limit;
    options.value = gas.value;

    let sent = client
        .send_transaction(TxKind::Create, data, &options)
        .await
        .map_err(|e| StartupError::Deploy(e.to_string()))?;
    Ok((sent.created_address(options.from), sent.hash))
}

/// Execute the completions command
pub fn completions(args: CompletionsArgs) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut io::stdout());
}
