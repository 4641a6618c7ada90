//! Event queries: filter construction, historical listing and live watching.

use alloy::dyn_abi::{DynSolType, DynSolValue, EventExt, Specifier};
use alloy::eips::BlockNumberOrTag;
use alloy::json_abi::Event;
use alloy::primitives::{keccak256, Address, B256};
use alloy::rpc::types::{Filter, Log};
use std::future::Future;
use tracing::{debug, info};

use crate::client::{ClientError, NetworkClient};
use crate::ui::formatter::{print_warning, Formatter};
use crate::ui::input::{input_text, input_yes_no, Prompter};
use crate::utils::arguments::{decode, encode, CodecError, CollectError};

/// One indexed argument of an event and the value it must match, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSlot {
    pub name: String,
    pub value: Option<DynSolValue>,
}

/// Match values for the indexed arguments of an event, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub slots: Vec<FilterSlot>,
}

impl FilterSpec {
    /// A filter matching every occurrence of `event`.
    pub fn match_all(event: &Event) -> Self {
        Self {
            slots: event
                .inputs
                .iter()
                .filter(|p| p.indexed)
                .map(|p| FilterSlot {
                    name: p.name.clone(),
                    value: None,
                })
                .collect(),
        }
    }

    /// Translate into a node log filter for `event` emitted by `address`.
    pub fn to_log_filter(&self, event: &Event, address: Address) -> Filter {
        let mut filter = Filter::new().address(address);
        let offset = if event.anonymous {
            0
        } else {
            filter = filter.event_signature(event.selector());
            1
        };

        for (i, slot) in self.slots.iter().enumerate() {
            if let (Some(value), Some(topic)) = (&slot.value, filter.topics.get_mut(offset + i)) {
                *topic = topic_word(value).into();
            }
        }
        filter
    }
}

/// Topic form of an indexed value: the word itself for value types, the hash
/// of the packed encoding otherwise.
pub fn topic_word(value: &DynSolValue) -> B256 {
    value
        .as_word()
        .unwrap_or_else(|| keccak256(value.abi_encode_packed()))
}

/// Ask, for every indexed argument, whether to filter on it and by what value.
///
/// Non-indexed arguments are never offered. A value that does not parse is
/// reported and asked for again.
pub fn build_filter(
    event: &Event,
    prompter: &mut dyn Prompter,
) -> Result<FilterSpec, CollectError> {
    let mut spec = FilterSpec::default();

    for param in event.inputs.iter().filter(|p| p.indexed) {
        let ty: DynSolType = param.resolve().map_err(|e| CodecError::InvalidType {
            ty: param.ty.clone(),
            reason: e.to_string(),
        })?;

        let question = format!("field {} ({}) is indexed. filter? (no): ", param.name, param.ty);
        let value = if input_yes_no(prompter, &question, false)? {
            loop {
                let text = input_text(prompter, "field value (none): ")?;
                if text.trim().is_empty() {
                    break None;
                }
                match encode(&text, &ty) {
                    Ok(value) => break Some(value),
                    Err(e) => print_warning(format!("error parsing value: {}", e)),
                }
            }
        } else {
            None
        };

        spec.slots.push(FilterSlot {
            name: param.name.clone(),
            value,
        });
    }

    debug!(
        slots = spec.slots.len(),
        constrained = spec.slots.iter().filter(|s| s.value.is_some()).count(),
        "Built event filter"
    );
    Ok(spec)
}

/// A decoded log entry.
#[derive(Debug)]
pub struct EventRecord {
    pub block_number: Option<u64>,
    pub fields: Vec<(String, Result<String, CodecError>)>,
}

impl EventRecord {
    /// Display lines: one line with every rendered field, then one line per
    /// field that could not be rendered.
    pub fn format(&self) -> Vec<String> {
        let block = self
            .block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "pending".to_string());

        let rendered: Vec<String> = self
            .fields
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .ok()
                    .map(|v| Formatter::format_field(name, v))
            })
            .collect();

        let mut lines = vec![format!("  block {}: {}", block, rendered.join(" "))
            .trim_end()
            .to_string()];
        for (name, value) in &self.fields {
            if let Err(e) = value {
                lines.push(format!("    {}: error: {}", name, e));
            }
        }
        lines
    }
}

/// Decode `log` as an occurrence of `event`.
pub fn decode_record(event: &Event, log: &Log) -> Result<EventRecord, CodecError> {
    let decoded = event
        .decode_log(log.data())
        .map_err(|e| CodecError::Decoding(e.to_string()))?;

    let mut indexed = decoded.indexed.iter();
    let mut body = decoded.body.iter();
    let fields = event
        .inputs
        .iter()
        .map(|param| {
            let value = if param.indexed {
                indexed.next()
            } else {
                body.next()
            };
            let rendered = match value {
                Some(v) => decode(v),
                None => Err(CodecError::Decoding(format!("missing field {}", param.name))),
            };
            (param.name.clone(), rendered)
        })
        .collect();

    Ok(EventRecord {
        block_number: log.block_number,
        fields,
    })
}

/// List the matching logs between `start` and `end` (latest when `None`).
///
/// Returns once the node's answer is drained; it never waits for new blocks.
pub async fn list_events<F>(
    client: &dyn NetworkClient,
    event: &Event,
    address: Address,
    spec: &FilterSpec,
    start: u64,
    end: Option<u64>,
    mut on_record: F,
) -> Result<usize, ClientError>
where
    F: FnMut(Result<EventRecord, CodecError>),
{
    let to_block = end
        .map(BlockNumberOrTag::Number)
        .unwrap_or(BlockNumberOrTag::Latest);
    let filter = spec
        .to_log_filter(event, address)
        .from_block(start)
        .to_block(to_block);

    crate::logging::log_event_query(&event.name, start, end);
    let logs = client.filter_logs(&filter).await?;
    for log in &logs {
        on_record(decode_record(event, log));
    }
    Ok(logs.len())
}

/// Follow new matching logs until `cancel` resolves or the subscription
/// fails, whichever comes first.
///
/// Cancellation is checked before anything else on every turn, so a signal
/// that has already fired ends the watch without handling buffered records.
pub async fn watch_events<C, F>(
    client: &dyn NetworkClient,
    event: &Event,
    address: Address,
    spec: &FilterSpec,
    cancel: C,
    mut on_record: F,
) -> Result<usize, ClientError>
where
    C: Future<Output = ()>,
    F: FnMut(Result<EventRecord, CodecError>),
{
    let filter = spec.to_log_filter(event, address);
    let mut watch = client.watch_logs(&filter).await?;
    crate::logging::log_watch_started(&event.name);

    tokio::pin!(cancel);
    let mut processed = 0usize;
    let mut errors_open = true;

    let outcome = loop {
        tokio::select! {
            biased;

            _ = &mut cancel => break Ok(()),

            error = watch.errors.recv(), if errors_open => match error {
                Some(e) => break Err(e),
                None => errors_open = false,
            },

            record = watch.records.recv() => match record {
                Some(log) => {
                    on_record(decode_record(event, &log));
                    processed += 1;
                }
                None => break Ok(()),
            },
        }
    };

    watch.unsubscribe();
    crate::logging::log_watch_stopped(&event.name, processed);
    outcome.map(|_| processed)
}

/// Resolves on Ctrl-C, or on SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            info!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
