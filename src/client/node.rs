use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxKind};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{Filter, Log, TransactionInput, TransactionRequest};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info};

use super::{ClientError, LogWatch, NetworkClient, SentTransaction};
use crate::signer::TransactionOptions;

/// [`NetworkClient`] backed by a JSON-RPC node over HTTP or WebSocket.
#[derive(Clone)]
pub struct NodeClient {
    provider: DynProvider,
}

impl NodeClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        info!(url, "Dialing node");
        let provider = ProviderBuilder::new()
            .connect(url)
            .await
            .map_err(|e| ClientError::Dial {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            provider: provider.erased(),
        })
    }
}

fn rpc<E: std::fmt::Display>(err: E) -> ClientError {
    ClientError::Rpc(err.to_string())
}

#[async_trait]
impl NetworkClient for NodeClient {
    async fn chain_id(&self) -> Result<u64, ClientError> {
        self.provider.get_chain_id().await.map_err(rpc)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError> {
        let request = TransactionRequest::default()
            .with_to(to)
            .with_input(data);
        self.provider.call(request).await.map_err(rpc)
    }

    async fn send_transaction(
        &self,
        to: TxKind,
        data: Bytes,
        options: &TransactionOptions,
    ) -> Result<SentTransaction, ClientError> {
        let chain_id = self.chain_id().await?;
        let nonce = self
            .provider
            .get_transaction_count(options.from)
            .pending()
            .await
            .map_err(rpc)?;
        let gas_price = match options.gas_price {
            Some(price) => price,
            None => self.suggest_gas_price().await?,
        };

        let mut request = TransactionRequest {
            from: Some(options.from),
            to: Some(to),
            input: TransactionInput::new(data),
            value: options.value,
            gas_price: Some(gas_price),
            nonce: Some(nonce),
            chain_id: Some(chain_id),
            ..Default::default()
        };
        let gas = match options.gas_limit {
            Some(limit) => limit,
            None => self
                .provider
                .estimate_gas(request.clone())
                .await
                .map_err(rpc)?,
        };
        request.gas = Some(gas);
        debug!(nonce, gas_price, gas, "Built transaction");

        let unsigned = request.build_typed_tx().map_err(|_| {
            ClientError::Incomplete("missing required transaction fields".to_string())
        })?;
        let envelope = options.signer.sign(options.from, unsigned).await?;
        let pending = self
            .provider
            .send_tx_envelope(envelope)
            .await
            .map_err(rpc)?;

        Ok(SentTransaction {
            hash: *pending.tx_hash(),
            nonce,
        })
    }

    async fn suggest_gas_price(&self) -> Result<u128, ClientError> {
        self.provider.get_gas_price().await.map_err(rpc)
    }

    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError> {
        self.provider.get_logs(filter).await.map_err(rpc)
    }

    async fn watch_logs(&self, filter: &Filter) -> Result<LogWatch, ClientError> {
        let poller = self
            .provider
            .watch_logs(filter)
            .await
            .map_err(|e| ClientError::Subscription(e.to_string()))?;
        let mut stream = poller.into_stream();

        let (record_tx, records) = unbounded_channel();
        let (error_tx, errors) = unbounded_channel();
        let task = tokio::spawn(async move {
            while let Some(batch) = stream.next().await {
                for log in batch {
                    if record_tx.send(log).is_err() {
                        return;
                    }
                }
            }
            let _ = error_tx.send(ClientError::Subscription(
                "log subscription ended".to_string(),
            ));
        });

        Ok(LogWatch::new(records, errors, Some(task)))
    }
}
