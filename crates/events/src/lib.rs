//! Costing facts emitted by the costing handlers.
//!
//! Handlers return events describing what they changed so hosts can audit or
//! forward them; nothing here stores or publishes them.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
