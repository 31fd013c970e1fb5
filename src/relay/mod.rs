//! Background relay tasks driven by storage events.
//!
//! With no hosted trigger runtime, event subscriptions are explicit polling
//! tasks: one watching a blob container for new objects, one consuming a
//! queue.

pub mod blob_watch;
pub mod queue_consumer;
