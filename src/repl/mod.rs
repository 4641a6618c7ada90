//! Interactive console for contract exploration
//!
//! The console presents a menu built from the contract interface. Read-only
//! methods, transactions, event queries and signer configuration are leaves
//! of that menu; branches are entered by name and left with `..`.
pub mod commands;
pub mod executor;
pub mod session;
pub mod tree;

pub use executor::Dispatcher;
pub use session::ReplSession;

use alloy::primitives::Address;
use std::sync::Arc;

use crate::client::NetworkClient;
use crate::config::SignerConfig;
use crate::schema::InterfaceSchema;
use crate::signer::hardware::default_hub;
use crate::signer::SignerHandle;
use crate::ui::ConsolePrompter;
use crate::{ConsoleError, Result};

/// Everything a console session needs
pub struct ReplConfig {
    pub client: Arc<dyn NetworkClient>,
    pub schema: InterfaceSchema,
    pub address: Address,
    pub signer: SignerHandle,
    pub settings: SignerConfig,
}

/// Start the interactive console on the terminal
pub async fn start_repl(config: ReplConfig) -> Result<()> {
    let tree = commands::build_tree(&config.schema).map_err(ConsoleError::from)?;
    let dispatcher = Dispatcher::new(
        config.client,
        config.schema,
        config.address,
        config.signer,
        default_hub(),
        config.settings,
    );
    let prompter = ConsolePrompter::new().map_err(ConsoleError::from)?;

    crate::logging::log_session_start(&config.address.to_string());
    let mut session = ReplSession::new(prompter, tree, dispatcher);
    session.run().await;
    crate::logging::log_session_end();
    Ok(())
}
