//! Console action execution.
//!
//! The [`Dispatcher`] runs the action bound to a menu leaf: read-only calls,
//! transactions, event queries and the signer configuration commands. Errors
//! are reported to the operator and never end the session.

use alloy::dyn_abi::{FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, Bytes, TxKind};
use std::future::Future;
use std::sync::Arc;

use super::commands::SignerCommand;
use super::tree::Action;
use crate::client::{NetworkClient, SentTransaction};
use crate::config::SignerConfig;
use crate::inspector::events::{self, build_filter, shutdown_signal, EventRecord};
use crate::logging;
use crate::schema::{EventDescriptor, InterfaceSchema, MethodDescriptor};
use crate::signer::hardware::{select_account, select_template, select_wallet, HardwareWallet};
use crate::signer::key::prompt_key;
use crate::signer::{
    HardwareSigner, SignerError, SignerHandle, SignerKind, WalletAccount, WalletHub,
};
use crate::ui::formatter::{print_error, print_info, print_success, print_warning, Formatter};
use crate::ui::input::{input_number_with_default, input_u256, input_yes_no, Prompter};
use crate::utils::arguments::{collect_arguments, decode, param_type, CallOutput, CodecError};
use crate::ConsoleError;

/// Executes menu actions against one deployed contract.
pub struct Dispatcher {
    client: Arc<dyn NetworkClient>,
    schema: InterfaceSchema,
    address: Address,
    signer: SignerHandle,
    hub: Box<dyn WalletHub>,
    settings: SignerConfig,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn NetworkClient>,
        schema: InterfaceSchema,
        address: Address,
        signer: SignerHandle,
        hub: Box<dyn WalletHub>,
        settings: SignerConfig,
    ) -> Self {
        Self {
            client,
            schema,
            address,
            signer,
            hub,
            settings,
        }
    }

    pub fn signer(&self) -> &SignerHandle {
        &self.signer
    }

    pub fn schema(&self) -> &InterfaceSchema {
        &self.schema
    }

    /// Run `action` for the leaf named `path` and report the outcome.
    ///
    /// Failures are printed here and then handed back, so the caller can
    /// stop on end of input.
    pub async fn dispatch(
        &mut self,
        action: &Action,
        path: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<(), ConsoleError> {
        let result = match action {
            Action::ConstantCall(label) => {
                let output = self.constant_call(label, prompter).await;
                output.and_then(|output| {
                    print_output(&self.method(label)?.function, &output);
                    Ok(())
                })
            }
            Action::Transact(label) => self.transact(label, prompter).await.map(|sent| {
                print_success(format!("transaction sent: {}", sent.hash));
            }),
            Action::ListEvents(label) => self.list_events(label, prompter).await.map(|count| {
                print_info(format!("{} event(s)", count));
            }),
            Action::WatchEvents(label) => self
                .watch_events(label, prompter, shutdown_signal())
                .await
                .map(|count| print_info(format!("stopped watching after {} event(s)", count))),
            Action::Command => self.run_command(path, prompter).await,
            Action::Up | Action::Help | Action::Exit => Ok(()),
        };

        if let Err(e) = &result {
            report(path, e);
        }
        result
    }

    /// Call a read-only method and decode what it returns.
    pub async fn constant_call(
        &self,
        label: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<CallOutput, ConsoleError> {
        let method = self.method(label)?;
        if !method.is_constant() {
            return Err(ConsoleError::NotConstant(label.to_string()));
        }
        let function = &method.function;

        let args = collect_arguments(&function.inputs, prompter)?;
        let data = encode_call(function, &args)?;
        logging::log_constant_call(label, args.len());

        let returned = self.client.call(self.address, data).await?;
        let values = function
            .abi_decode_output(&returned)
            .map_err(|e| CodecError::Decoding(e.to_string()))?;
        Ok(CallOutput::from(values))
    }

    /// Collect arguments and settings for a state-changing method and submit it.
    pub async fn transact(
        &self,
        label: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<SentTransaction, ConsoleError> {
        let method = self.method(label)?;
        if method.is_constant() {
            return Err(ConsoleError::Constant(label.to_string()));
        }
        if self.signer.kind() == SignerKind::None {
            return Err(ConsoleError::SignerNotConfigured);
        }
        let function = &method.function;

        let args = collect_arguments(&function.inputs, prompter)?;
        let data = encode_call(function, &args)?;

        let chain_id = self.client.chain_id().await?;
        let mut options = self.signer.transact_options(chain_id)?;

        if method.is_payable()
            && input_yes_no(
                prompter,
                "method is payable. send amount with transaction? (no): ",
                false,
            )?
        {
            options.value = Some(input_u256(prompter, "amount: ")?);
        }

        if !input_yes_no(prompter, "estimate gas price? (yes): ", true)? {
            let suggested = self.client.suggest_gas_price().await?;
            let prompt = format!("gas price ({}): ", suggested);
            options.gas_price = Some(input_number_with_default(prompter, &prompt, suggested)?);
        }

        if !input_yes_no(prompter, "estimate gas limit? (yes): ", true)? {
            let limit: u64 = input_number_with_default(prompter, "gas limit (0): ", 0)?;
            options.gas_limit = (limit > 0).then_some(limit);
        }

        let sent = self
            .client
            .send_transaction(TxKind::Call(self.address), data, &options)
            .await?;
        logging::log_transaction_sent(label, &sent.hash.to_string());
        Ok(sent)
    }

    /// Print past occurrences of an event in a block range.
    pub async fn list_events(
        &self,
        label: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<usize, ConsoleError> {
        let descriptor = self.event(label)?;
        let spec = build_filter(&descriptor.event, prompter)?;

        let start: u64 = input_number_with_default(prompter, "start block (0): ", 0)?;
        let end: i64 = input_number_with_default(prompter, "end block (last, -1): ", -1)?;
        let end = u64::try_from(end).ok();

        Ok(events::list_events(
            self.client.as_ref(),
            &descriptor.event,
            self.address,
            &spec,
            start,
            end,
            print_record,
        )
        .await?)
    }

    /// Print new occurrences of an event until `cancel` resolves.
    pub async fn watch_events<C>(
        &self,
        label: &str,
        prompter: &mut dyn Prompter,
        cancel: C,
    ) -> Result<usize, ConsoleError>
    where
        C: Future<Output = ()>,
    {
        let descriptor = self.event(label)?;
        let spec = build_filter(&descriptor.event, prompter)?;

        print_info("watching, press Ctrl-C to stop");
        Ok(events::watch_events(
            self.client.as_ref(),
            &descriptor.event,
            self.address,
            &spec,
            cancel,
            print_record,
        )
        .await?)
    }

    /// Run the side-effect command registered under `path`.
    pub async fn run_command(
        &mut self,
        path: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<(), ConsoleError> {
        let command = SignerCommand::from_path(path)
            .ok_or_else(|| ConsoleError::UndefinedCommand(path.to_string()))?;

        match command {
            SignerCommand::Key => {
                let key = prompt_key(prompter)?;
                let address = key.address();
                self.signer.replace(SignerHandle::Keyed(key)).await;
                logging::log_signer_configured("key", &address.to_string());
                print_success(format!("signer set to key {}", address));
            }
            SignerCommand::Ledger => {
                let hardware = self.configure_hardware(prompter).await?;
                let address = hardware.account.address;
                self.signer.replace(SignerHandle::Hardware(hardware)).await;
                logging::log_signer_configured("hardware", &address.to_string());
                print_success(format!("signer set to hardware account {}", address));
            }
            SignerCommand::Show => {
                println!("{}", self.signer.describe().await);
            }
        }
        Ok(())
    }

    /// Choose a wallet and an account on it. The active signer is untouched.
    async fn configure_hardware(
        &self,
        prompter: &mut dyn Prompter,
    ) -> Result<HardwareSigner, SignerError> {
        let wallets = self.hub.wallets().await?;
        let wallet = select_wallet(prompter, wallets)?;
        wallet.open().await?;

        let chosen = self.choose_account(prompter, wallet.as_ref()).await;
        match chosen {
            Ok(account) => Ok(HardwareSigner { wallet, account }),
            Err(e) => {
                if !self.uses_wallet(&wallet) {
                    let _ = wallet.close().await;
                }
                Err(e)
            }
        }
    }

    async fn choose_account(
        &self,
        prompter: &mut dyn Prompter,
        wallet: &dyn HardwareWallet,
    ) -> Result<WalletAccount, SignerError> {
        match wallet.status().await {
            Ok(status) => print_info(format!("{}: {}", wallet.url(), status)),
            Err(e) => print_warning(format!("{}: {}", wallet.url(), e)),
        }
        let template = select_template(prompter, self.settings.derivation_path())?;
        select_account(prompter, wallet, &template, self.settings.address_batch()).await
    }

    fn uses_wallet(&self, wallet: &Arc<dyn HardwareWallet>) -> bool {
        matches!(&self.signer, SignerHandle::Hardware(hw) if Arc::ptr_eq(&hw.wallet, wallet))
    }

    /// Release the signer at the end of the session.
    pub async fn shutdown(&mut self) {
        self.signer.close().await;
    }

    fn method(&self, label: &str) -> Result<&MethodDescriptor, ConsoleError> {
        self.schema
            .method(label)
            .ok_or_else(|| ConsoleError::UnknownMethod(label.to_string()))
    }

    fn event(&self, label: &str) -> Result<&EventDescriptor, ConsoleError> {
        self.schema
            .event(label)
            .ok_or_else(|| ConsoleError::UnknownEvent(label.to_string()))
    }
}

fn encode_call(
    function: &Function,
    args: &[alloy::dyn_abi::DynSolValue],
) -> Result<Bytes, CodecError> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Lines printed for the values returned by `function`.
pub fn format_output(function: &Function, output: &CallOutput) -> Vec<String> {
    let values = output.values();
    if values.is_empty() {
        return vec!["returned nothing".to_string()];
    }

    let mut lines = vec!["returned:".to_string()];
    for (i, value) in values.into_iter().enumerate() {
        let (ty, name) = function
            .outputs
            .get(i)
            .map(|p| {
                let ty = param_type(p)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|_| p.ty.clone());
                (ty, p.name.clone())
            })
            .unwrap_or_default();
        let rendered = decode(value).unwrap_or_else(|e| format!("<{}>", e));
        lines.push(Formatter::format_output_line(&ty, &name, &rendered));
    }
    lines
}

fn print_output(function: &Function, output: &CallOutput) {
    for line in format_output(function, output) {
        println!("{}", line);
    }
}

fn print_record(record: Result<EventRecord, CodecError>) {
    match record {
        Ok(record) => {
            for line in record.format() {
                println!("{}", line);
            }
        }
        Err(e) => print_warning(format!("  undecodable event: {}", e)),
    }
}

fn report(path: &str, error: &ConsoleError) {
    if error.is_aborted() {
        print_warning(format!("{}: aborted", path));
    } else {
        print_error(format!("{}: {}", path, error));
    }
}
