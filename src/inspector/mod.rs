pub mod events;

pub use events::{
    build_filter, decode_record, list_events, shutdown_signal, watch_events, EventRecord,
    FilterSlot, FilterSpec,
};
