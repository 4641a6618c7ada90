//! Ledger node access.
//!
//! The console talks to the network only through [`NetworkClient`], which
//! keeps the dispatcher and the event loops testable without a node.

pub mod node;

use alloy::primitives::{Address, Bytes, TxHash, TxKind};
use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::signer::{SignerError, TransactionOptions};

pub use node::NodeClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to connect to {url}: {reason}")]
    Dial { url: String, reason: String },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Incomplete transaction: {0}")]
    Incomplete(String),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("Subscription error: {0}")]
    Subscription(String),
}

/// Handle of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: TxHash,
    pub nonce: u64,
}

impl SentTransaction {
    /// Address of the contract created by a deployment from `from`.
    pub fn created_address(&self, from: Address) -> Address {
        from.create(self.nonce)
    }
}

/// A live log subscription.
///
/// Records and subscription failures arrive on separate channels. Dropping
/// the watch unsubscribes.
#[derive(Debug)]
pub struct LogWatch {
    pub records: UnboundedReceiver<Log>,
    pub errors: UnboundedReceiver<ClientError>,
    task: Option<JoinHandle<()>>,
}

impl LogWatch {
    pub fn new(
        records: UnboundedReceiver<Log>,
        errors: UnboundedReceiver<ClientError>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            records,
            errors,
            task,
        }
    }

    /// A watch fed by the returned senders, with no background task.
    pub fn channel() -> (UnboundedSender<Log>, UnboundedSender<ClientError>, Self) {
        let (record_tx, records) = unbounded_channel();
        let (error_tx, errors) = unbounded_channel();
        (record_tx, error_tx, Self::new(records, errors, None))
    }

    pub fn unsubscribe(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.records.close();
        self.errors.close();
    }
}

impl Drop for LogWatch {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ClientError>;

    /// Execute a read-only call and return the raw result.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError>;

    /// Build, sign and submit a transaction.
    async fn send_transaction(
        &self,
        to: TxKind,
        data: Bytes,
        options: &TransactionOptions,
    ) -> Result<SentTransaction, ClientError>;

    async fn suggest_gas_price(&self) -> Result<u128, ClientError>;

    /// Logs already recorded on chain that match `filter`.
    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError>;

    /// Subscribe to new logs matching `filter`.
    async fn watch_logs(&self, filter: &Filter) -> Result<LogWatch, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, B256};

    #[test]
    fn test_created_address() {
        let sent = SentTransaction {
            hash: B256::ZERO,
            nonce: 0,
        };
        let from = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(
            sent.created_address(from),
            address!("5FbDB2315678afecb367f032d93F642f64180aa3")
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_channels() {
        let (record_tx, _error_tx, mut watch) = LogWatch::channel();
        watch.unsubscribe();
        assert!(record_tx.send(Log::default()).is_err());
    }
}
