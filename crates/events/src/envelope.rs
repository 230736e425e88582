use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stockcost_core::{CompanyContext, CompanyId};

use crate::Event;

/// Envelope for an event, carrying the company scope and batch position.
///
/// `sequence_number` orders the facts produced by one handler call, starting
/// at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    company_id: CompanyId,
    event_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    pub fn new(event_id: Uuid, company_id: CompanyId, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id,
            company_id,
            event_type: payload.event_type().to_string(),
            sequence_number,
            payload,
        }
    }

    /// Wrap a batch of events in order, numbering them from 1.
    pub fn seal_all(ctx: &CompanyContext, events: impl IntoIterator<Item = E>) -> Vec<Self> {
        events
            .into_iter()
            .zip(1u64..)
            .map(|(payload, seq)| Self::new(Uuid::now_v7(), ctx.company_id, seq, payload))
            .collect()
    }
}

impl<E> EventEnvelope<E> {
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
