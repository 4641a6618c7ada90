//! Transaction signing.
//!
//! A [`SignerHandle`] is the single active signer of a session: nothing, a
//! private key held in memory, or an account on a hardware wallet. It hands
//! out [`TransactionOptions`] whose [`SigningFn`] is bound to that signer.

pub mod hardware;
pub mod key;

use alloy::consensus::{TxEnvelope, TypedTransaction};
use alloy::network::{Ethereum, EthereumWallet, NetworkWallet};
use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::ui::input::InputError;

pub use hardware::{HardwareWallet, WalletAccount, WalletError, WalletHub};
pub use key::{parse_key, KeyError};

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signer not configured")]
    NotConfigured,

    #[error("address mismatch: signer is bound to {expected}, asked to sign for {actual}")]
    AddressMismatch { expected: Address, actual: Address },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    None,
    Keyed,
    Hardware,
}

/// An open hardware wallet and the account selected on it.
#[derive(Clone)]
pub struct HardwareSigner {
    pub wallet: Arc<dyn HardwareWallet>,
    pub account: WalletAccount,
}

impl fmt::Debug for HardwareSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareSigner")
            .field("wallet", &self.wallet.url())
            .field("account", &self.account)
            .finish()
    }
}

#[derive(Debug, Default)]
pub enum SignerHandle {
    #[default]
    None,
    Keyed(PrivateKeySigner),
    Hardware(HardwareSigner),
}

impl SignerHandle {
    pub fn kind(&self) -> SignerKind {
        match self {
            SignerHandle::None => SignerKind::None,
            SignerHandle::Keyed(_) => SignerKind::Keyed,
            SignerHandle::Hardware(_) => SignerKind::Hardware,
        }
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            SignerHandle::None => None,
            SignerHandle::Keyed(key) => Some(key.address()),
            SignerHandle::Hardware(hw) => Some(hw.account.address),
        }
    }

    /// Options for one transaction on `chain_id`. Gas and value are left for
    /// the caller to fill in.
    pub fn transact_options(&self, chain_id: u64) -> Result<TransactionOptions, SignerError> {
        let (from, signer) = match self {
            SignerHandle::None => return Err(SignerError::NotConfigured),
            SignerHandle::Keyed(key) => (
                key.address(),
                SigningFn::Keyed(EthereumWallet::from(key.clone())),
            ),
            SignerHandle::Hardware(hw) => (
                hw.account.address,
                SigningFn::Hardware {
                    wallet: Arc::clone(&hw.wallet),
                    account: hw.account.clone(),
                    chain_id,
                },
            ),
        };

        Ok(TransactionOptions {
            from,
            gas_price: None,
            gas_limit: None,
            value: None,
            signer,
        })
    }

    /// Install `next` as the active signer.
    ///
    /// A hardware session held by the current signer is closed first, unless
    /// `next` keeps using the same wallet.
    pub async fn replace(&mut self, next: SignerHandle) {
        if let SignerHandle::Hardware(current) = &*self {
            let reused = matches!(
                &next,
                SignerHandle::Hardware(hw) if Arc::ptr_eq(&hw.wallet, &current.wallet)
            );
            if !reused {
                if let Err(e) = current.wallet.close().await {
                    warn!(
                        wallet = %current.wallet.url(),
                        error = %e,
                        "Failed to close hardware wallet"
                    );
                }
            }
        }
        *self = next;
    }

    /// Release the signer, closing any hardware session.
    pub async fn close(&mut self) {
        self.replace(SignerHandle::None).await;
    }

    /// Human readable description of the active signer.
    pub async fn describe(&self) -> String {
        match self {
            SignerHandle::None => "no signer configured".to_string(),
            SignerHandle::Keyed(key) => format!("key signer\naddress: {}", key.address()),
            SignerHandle::Hardware(hw) => {
                let status = hw
                    .wallet
                    .status()
                    .await
                    .unwrap_or_else(|e| format!("status unavailable: {}", e));
                format!(
                    "hardware wallet {}\nstatus: {}\naddress: {} ({})",
                    hw.wallet.url(),
                    status,
                    hw.account.address,
                    hw.account.path
                )
            }
        }
    }
}

/// Per-transaction settings. `None` fields are estimated by the network.
#[derive(Debug, Clone)]
pub struct TransactionOptions {
    pub from: Address,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    pub value: Option<U256>,
    pub signer: SigningFn,
}

/// Signs a built transaction with the signer the options were issued for.
#[derive(Clone)]
pub enum SigningFn {
    Keyed(EthereumWallet),
    Hardware {
        wallet: Arc<dyn HardwareWallet>,
        account: WalletAccount,
        chain_id: u64,
    },
}

impl fmt::Debug for SigningFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningFn::Keyed(_) => f.write_str("SigningFn::Keyed"),
            SigningFn::Hardware { account, .. } => f
                .debug_struct("SigningFn::Hardware")
                .field("account", &account.address)
                .finish(),
        }
    }
}

impl SigningFn {
    pub async fn sign(
        &self,
        from: Address,
        tx: TypedTransaction,
    ) -> Result<TxEnvelope, SignerError> {
        match self {
            SigningFn::Keyed(wallet) => {
                NetworkWallet::<Ethereum>::sign_transaction_from(wallet, from, tx)
                    .await
                    .map_err(|e| SignerError::Signing(e.to_string()))
            }
            SigningFn::Hardware {
                wallet,
                account,
                chain_id,
            } => {
                if from != account.address {
                    return Err(SignerError::AddressMismatch {
                        expected: account.address,
                        actual: from,
                    });
                }
                Ok(wallet.sign_transaction(account, tx, *chain_id).await?)
            }
        }
    }
}
