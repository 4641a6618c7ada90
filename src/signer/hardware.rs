//! Hardware wallet collaborators and account selection.

use alloy::consensus::{TxEnvelope, TypedTransaction};
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::ui::formatter::print_info;
use crate::ui::input::{input_multi_choice, input_text, Prompter};

use super::SignerError;

/// Ledger Live layout, one account per index.
pub const LEDGER_LIVE_TEMPLATE: &str = "m/44'/60'/x'/0/0";

/// Legacy MEW/Ledger Chrome layout.
pub const LEGACY_TEMPLATE: &str = "m/44'/60'/0'/x";

pub const CUSTOM_TEMPLATE: &str = "custom";

/// How many derived accounts are searched when looking an address up.
pub const ACCOUNT_SEARCH_DEPTH: u32 = 5;

/// Upper bound on accounts derived per selection page.
pub const MAX_ADDRESS_BATCH: u32 = 50;

const MORE_CHOICE: &str = "more";

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no hardware wallet found")]
    NotFound,

    #[error("failed to open wallet {url}: {reason}")]
    Open { url: String, reason: String },

    #[error("failed to derive account at {path}: {reason}")]
    Derive { path: String, reason: String },

    #[error("wallet status unavailable: {0}")]
    Status(String),

    #[error("wallet signing failed: {0}")]
    Sign(String),

    #[error("wallet is not open")]
    NotOpen,

    #[error("address {0} not found in the first derived accounts")]
    AccountNotFound(Address),

    #[error("hardware wallet support is not available in this build (enable the `ledger` feature)")]
    Unsupported,
}

/// An address on a hardware wallet and the path it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: Address,
    pub path: String,
}

/// A hardware wallet session.
///
/// All methods take `&self`; implementations hold the device connection
/// behind their own lock so a session can be shared by the signer handle and
/// outstanding signing functions.
#[async_trait]
pub trait HardwareWallet: Send + Sync {
    fn url(&self) -> String;

    async fn open(&self) -> Result<(), WalletError>;

    async fn derive_account(&self, path: &str) -> Result<WalletAccount, WalletError>;

    async fn status(&self) -> Result<String, WalletError>;

    async fn sign_transaction(
        &self,
        account: &WalletAccount,
        tx: TypedTransaction,
        chain_id: u64,
    ) -> Result<TxEnvelope, WalletError>;

    async fn close(&self) -> Result<(), WalletError>;
}

/// Enumerates the hardware wallets available to the process.
#[async_trait]
pub trait WalletHub: Send + Sync {
    async fn wallets(&self) -> Result<Vec<Arc<dyn HardwareWallet>>, WalletError>;
}

/// Expand a path template by substituting `x` with `index`.
pub fn derivation_path(template: &str, index: u32) -> String {
    template.replace('x', &index.to_string())
}

/// Open the wallet hub this build supports.
pub fn default_hub() -> Box<dyn WalletHub> {
    #[cfg(feature = "ledger")]
    {
        Box::new(ledger::LedgerHub::default())
    }
    #[cfg(not(feature = "ledger"))]
    {
        Box::new(UnavailableHub)
    }
}

/// Hub used when no hardware transport is compiled in.
#[derive(Debug, Default)]
pub struct UnavailableHub;

#[async_trait]
impl WalletHub for UnavailableHub {
    async fn wallets(&self) -> Result<Vec<Arc<dyn HardwareWallet>>, WalletError> {
        Err(WalletError::Unsupported)
    }
}

/// Find `wanted` among the first derived accounts, or take the first account
/// when no address is given.
pub async fn find_account(
    wallet: &dyn HardwareWallet,
    template: &str,
    wanted: Option<Address>,
) -> Result<WalletAccount, WalletError> {
    let Some(wanted) = wanted else {
        return wallet.derive_account(&derivation_path(template, 0)).await;
    };

    for index in 0..ACCOUNT_SEARCH_DEPTH {
        let account = wallet.derive_account(&derivation_path(template, index)).await?;
        debug!(path = %account.path, address = %account.address, "Derived account");
        if account.address == wanted {
            return Ok(account);
        }
    }
    Err(WalletError::AccountNotFound(wanted))
}

/// Pick a wallet from `wallets`, asking only when there is more than one.
pub fn select_wallet(
    prompter: &mut dyn Prompter,
    wallets: Vec<Arc<dyn HardwareWallet>>,
) -> Result<Arc<dyn HardwareWallet>, SignerError> {
    let urls: Vec<String> = wallets.iter().map(|w| w.url()).collect();
    match urls.len() {
        0 => Err(WalletError::NotFound.into()),
        1 => Ok(Arc::clone(&wallets[0])),
        _ => {
            let prompt = format!("wallet ({}): ", urls[0]);
            let url = input_multi_choice(prompter, &prompt, &urls[0], &urls, "choose a wallet")?;
            let position = urls.iter().position(|u| *u == url).unwrap_or(0);
            Ok(Arc::clone(&wallets[position]))
        }
    }
}

/// Ask for a derivation path template. `default` is offered first.
pub fn select_template(prompter: &mut dyn Prompter, default: &str) -> Result<String, SignerError> {
    let mut choices = vec![
        LEDGER_LIVE_TEMPLATE.to_string(),
        LEGACY_TEMPLATE.to_string(),
        CUSTOM_TEMPLATE.to_string(),
    ];
    if !choices.iter().any(|c| c == default) {
        choices.insert(0, default.to_string());
    }

    let prompt = format!("derivation path ({}): ", default);
    let help = "choose a path template; `x` is replaced by the account index";
    let picked = input_multi_choice(prompter, &prompt, default, &choices, help)?;
    if picked != CUSTOM_TEMPLATE {
        return Ok(picked);
    }

    loop {
        let custom = input_text(prompter, "path template: ")?;
        let custom = custom.trim();
        if !custom.is_empty() {
            return Ok(custom.to_string());
        }
    }
}

/// Page through derived accounts, `batch` at a time, until one is chosen.
///
/// A template without an `x` placeholder names a single account, which is
/// returned without asking.
pub async fn select_account(
    prompter: &mut dyn Prompter,
    wallet: &dyn HardwareWallet,
    template: &str,
    batch: u32,
) -> Result<WalletAccount, SignerError> {
    if !template.contains('x') {
        return Ok(wallet.derive_account(template).await?);
    }

    let batch = batch.clamp(1, MAX_ADDRESS_BATCH);
    let mut offset = 0u32;
    loop {
        let end = offset.saturating_add(batch);
        let mut accounts = Vec::with_capacity((end - offset) as usize);
        for index in offset..end {
            accounts.push(wallet.derive_account(&derivation_path(template, index)).await?);
        }
        if accounts.is_empty() {
            return Err(WalletError::Derive {
                path: derivation_path(template, offset),
                reason: "no accounts left to derive".to_string(),
            }
            .into());
        }

        let mut choices: Vec<String> = accounts.iter().map(|a| a.address.to_string()).collect();
        choices.push(MORE_CHOICE.to_string());

        print_info(format!("accounts {} to {}", offset, end - 1));
        let prompt = format!("account ({}): ", choices[0]);
        let picked = input_multi_choice(
            prompter,
            &prompt,
            &choices[0],
            &choices,
            "choose an account or `more` for the next page",
        )?;

        if picked == MORE_CHOICE {
            offset = end;
            continue;
        }
        if let Some(account) = accounts.into_iter().find(|a| a.address.to_string() == picked) {
            return Ok(account);
        }
    }
}

#[cfg(feature = "ledger")]
mod ledger {
    use super::*;
    use alloy::consensus::SignableTransaction;
    use alloy::network::TxSigner;
    use alloy::primitives::Signature;
    use alloy::signers::ledger::{HDPath, LedgerSigner};
    use tokio::sync::Mutex;

    /// Hub exposing the single USB Ledger device.
    ///
    /// The same session object is returned on every listing so re-selecting
    /// the wallet keeps its connection.
    #[derive(Default)]
    pub struct LedgerHub {
        wallet: Arc<LedgerWallet>,
    }

    #[async_trait]
    impl WalletHub for LedgerHub {
        async fn wallets(&self) -> Result<Vec<Arc<dyn HardwareWallet>>, WalletError> {
            Ok(vec![self.wallet.clone() as Arc<dyn HardwareWallet>])
        }
    }

    struct Session {
        path: String,
        signer: LedgerSigner,
    }

    #[derive(Default)]
    pub struct LedgerWallet {
        session: Mutex<Option<Session>>,
    }

    impl LedgerWallet {
        async fn connect(path: &str, chain_id: Option<u64>) -> Result<Session, WalletError> {
            let signer = LedgerSigner::new(HDPath::Other(path.to_string()), chain_id)
                .await
                .map_err(|e| WalletError::Open {
                    url: "ledger://0".to_string(),
                    reason: e.to_string(),
                })?;
            Ok(Session {
                path: path.to_string(),
                signer,
            })
        }
    }

    #[async_trait]
    impl HardwareWallet for LedgerWallet {
        fn url(&self) -> String {
            "ledger://0".to_string()
        }

        async fn open(&self) -> Result<(), WalletError> {
            let mut session = self.session.lock().await;
            if session.is_none() {
                let path = derivation_path(LEDGER_LIVE_TEMPLATE, 0);
                *session = Some(Self::connect(&path, None).await?);
            }
            Ok(())
        }

        async fn derive_account(&self, path: &str) -> Result<WalletAccount, WalletError> {
            let session = self.session.lock().await;
            let session = session.as_ref().ok_or(WalletError::NotOpen)?;
            let address = session
                .signer
                .get_address_with_path(&HDPath::Other(path.to_string()))
                .await
                .map_err(|e| WalletError::Derive {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(WalletAccount {
                address,
                path: path.to_string(),
            })
        }

        async fn status(&self) -> Result<String, WalletError> {
            let session = self.session.lock().await;
            let session = session.as_ref().ok_or(WalletError::NotOpen)?;
            let version = session
                .signer
                .version()
                .await
                .map_err(|e| WalletError::Status(e.to_string()))?;
            Ok(format!("Ethereum app v{} online", version))
        }

        async fn sign_transaction(
            &self,
            account: &WalletAccount,
            tx: TypedTransaction,
            chain_id: u64,
        ) -> Result<TxEnvelope, WalletError> {
            let mut session = self.session.lock().await;
            let rebind = session.as_ref().map_or(true, |s| s.path != account.path);
            if rebind {
                // the device allows a single transport handle
                *session = None;
                *session = Some(Self::connect(&account.path, Some(chain_id)).await?);
            }
            let session = session.as_ref().ok_or(WalletError::NotOpen)?;
            sign_with(&session.signer, tx).await
        }

        async fn close(&self) -> Result<(), WalletError> {
            self.session.lock().await.take();
            Ok(())
        }
    }

    async fn sign_with(
        signer: &LedgerSigner,
        tx: TypedTransaction,
    ) -> Result<TxEnvelope, WalletError> {
        async fn signed<T>(signer: &LedgerSigner, mut tx: T) -> Result<TxEnvelope, WalletError>
        where
            T: SignableTransaction<Signature> + Send,
            alloy::consensus::Signed<T>: Into<TxEnvelope>,
        {
            let signature = TxSigner::<Signature>::sign_transaction(signer, &mut tx)
                .await
                .map_err(|e| WalletError::Sign(e.to_string()))?;
            Ok(tx.into_signed(signature).into())
        }

        match tx {
            TypedTransaction::Legacy(tx) => signed(signer, tx).await,
            TypedTransaction::Eip2930(tx) => signed(signer, tx).await,
            TypedTransaction::Eip1559(tx) => signed(signer, tx).await,
            TypedTransaction::Eip4844(tx) => signed(signer, tx).await,
            TypedTransaction::Eip7702(tx) => signed(signer, tx).await,
        }
    }
}
