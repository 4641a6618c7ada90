//! Structured logging helpers for the console.
//!
//! Helper functions keep event names and field keys consistent across the
//! crate. All of them go through the `tracing` crate; the subscriber is set
//! up in `main`.

/// Log interface file loading.
pub fn log_loading_abi(path: &str) {
    tracing::info!(abi = path, "Loading contract interface");
}

/// Log a loaded interface.
pub fn log_abi_loaded(methods: usize, events: usize) {
    tracing::info!(methods, events, "Contract interface loaded");
}

/// Log connecting to a node.
pub fn log_dialing(url: &str) {
    tracing::info!(url, "Connecting to node");
}

pub fn log_connected(chain_id: u64) {
    tracing::info!(chain_id, "Connected to node");
}

/// Log a read-only call.
pub fn log_constant_call(method: &str, arguments: usize) {
    tracing::debug!(method, arguments, "Calling constant method");
}

/// Log a submitted transaction.
pub fn log_transaction_sent(method: &str, hash: &str) {
    tracing::info!(method, tx = hash, "Transaction sent");
}

/// Log a contract deployment.
pub fn log_deployed(address: &str, hash: &str) {
    tracing::info!(address, tx = hash, "Contract deployed");
}

/// Log a signer change.
pub fn log_signer_configured(kind: &str, address: &str) {
    tracing::info!(kind, address, "Signer configured");
}

/// Log a historical event query.
pub fn log_event_query(event: &str, start: u64, end: Option<u64>) {
    match end {
        Some(end) => tracing::debug!(event, start, end, "Querying events"),
        None => tracing::debug!(event, start, end = "latest", "Querying events"),
    }
}

pub fn log_watch_started(event: &str) {
    tracing::info!(event, "Watching events");
}

pub fn log_watch_stopped(event: &str, records: usize) {
    tracing::info!(event, records, "Stopped watching events");
}

/// Log the console session lifecycle.
pub fn log_session_start(contract: &str) {
    tracing::info!(contract, "Console session started");
}

pub fn log_session_end() {
    tracing::info!("Console session ended");
}
