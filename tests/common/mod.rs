#![allow(dead_code)]
//! Collaborator doubles shared by the integration tests.

use alloy::consensus::{TxEnvelope, TypedTransaction};
use alloy::primitives::{keccak256, Address, Bytes, LogData, TxKind, B256, U256};
use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use scui::client::{ClientError, LogWatch, NetworkClient, SentTransaction};
use scui::signer::{HardwareWallet, TransactionOptions, WalletAccount, WalletError, WalletHub};
use scui::ui::{InputError, Prompter};

pub const TOKEN_ABI: &str = r#"[
    {"type":"function","name":"balanceOf","stateMutability":"view",
     "inputs":[{"name":"owner","type":"address"}],
     "outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]},
    {"type":"function","name":"deposit","stateMutability":"payable","inputs":[],"outputs":[]},
    {"type":"event","name":"Transfer","anonymous":false,"inputs":[
        {"name":"from","type":"address","indexed":true},
        {"name":"to","type":"address","indexed":true},
        {"name":"value","type":"uint256","indexed":false}]}
]"#;

pub const CONTRACT: Address = Address::new([0x42; 20]);

/// What a mock client was asked to send.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub to: TxKind,
    pub data: Bytes,
    pub from: Address,
    pub gas_price: Option<u128>,
    pub gas_limit: Option<u64>,
    pub value: Option<U256>,
}

/// Network client answering from canned data.
#[derive(Default)]
pub struct MockClient {
    pub call_result: Mutex<Bytes>,
    pub logs: Mutex<Vec<Log>>,
    pub gas_price: u128,
    pub sent: Mutex<Vec<SentRecord>>,
    pub filters: Mutex<Vec<Filter>>,
    pub calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gas_price: 42,
            ..Default::default()
        })
    }

    pub fn with_call_result(data: Vec<u8>) -> Arc<Self> {
        let client = Self::new();
        *client.call_result.lock().unwrap() = data.into();
        client
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkClient for MockClient {
    async fn chain_id(&self) -> Result<u64, ClientError> {
        Ok(31337)
    }

    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.call_result.lock().unwrap().clone())
    }

    async fn send_transaction(
        &self,
        to: TxKind,
        data: Bytes,
        options: &TransactionOptions,
    ) -> Result<SentTransaction, ClientError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentRecord {
            to,
            data,
            from: options.from,
            gas_price: options.gas_price,
            gas_limit: options.gas_limit,
            value: options.value,
        });
        Ok(SentTransaction {
            hash: B256::with_last_byte(sent.len() as u8),
            nonce: (sent.len() - 1) as u64,
        })
    }

    async fn suggest_gas_price(&self) -> Result<u128, ClientError> {
        Ok(self.gas_price)
    }

    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError> {
        self.filters.lock().unwrap().push(filter.clone());
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn watch_logs(&self, filter: &Filter) -> Result<LogWatch, ClientError> {
        self.filters.lock().unwrap().push(filter.clone());
        let (records, _errors, watch) = LogWatch::channel();
        for log in self.logs.lock().unwrap().iter() {
            let _ = records.send(log.clone());
        }
        // senders drop here, so the watch ends once the buffer is drained
        Ok(watch)
    }
}

/// A `Transfer(from, to, value)` log emitted by [`CONTRACT`].
pub fn transfer_log(from: Address, to: Address, value: u64, block: u64) -> Log {
    let topics = vec![
        keccak256("Transfer(address,address,uint256)"),
        from.into_word(),
        to.into_word(),
    ];
    let data = U256::from(value).to_be_bytes::<32>().to_vec();
    Log {
        inner: alloy::primitives::Log {
            address: CONTRACT,
            data: LogData::new_unchecked(topics, data.into()),
        },
        block_number: Some(block),
        ..Default::default()
    }
}

/// Prompter that replays a fixed script and records every prompt shown.
pub struct ScriptedPrompter {
    pub answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }

    pub fn asked(&self, prompt: &str) -> bool {
        self.prompts.iter().any(|p| p == prompt)
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(InputError::Eof)
    }

    fn read_password(&mut self, prompt: &str) -> Result<String, InputError> {
        self.read_line(prompt)
    }
}

/// Hardware wallet double deriving a distinct address per path.
#[derive(Default)]
pub struct MockWallet {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
}

pub fn wallet_address(path: &str) -> Address {
    Address::from_word(keccak256(path))
}

#[async_trait]
impl HardwareWallet for MockWallet {
    fn url(&self) -> String {
        "mock://ledger".to_string()
    }

    async fn open(&self) -> Result<(), WalletError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn derive_account(&self, path: &str) -> Result<WalletAccount, WalletError> {
        Ok(WalletAccount {
            address: wallet_address(path),
            path: path.to_string(),
        })
    }

    async fn status(&self) -> Result<String, WalletError> {
        Ok("Ethereum app open".to_string())
    }

    async fn sign_transaction(
        &self,
        _account: &WalletAccount,
        _tx: TypedTransaction,
        _chain_id: u64,
    ) -> Result<TxEnvelope, WalletError> {
        Err(WalletError::Sign("mock wallet does not sign".to_string()))
    }

    async fn close(&self) -> Result<(), WalletError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hub listing a fixed set of wallets.
pub struct MockHub(pub Vec<Arc<MockWallet>>);

#[async_trait]
impl WalletHub for MockHub {
    async fn wallets(&self) -> Result<Vec<Arc<dyn HardwareWallet>>, WalletError> {
        Ok(self
            .0
            .iter()
            .map(|w| Arc::clone(w) as Arc<dyn HardwareWallet>)
            .collect())
    }
}

/// Temporary directory holding test input files.
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }
}
