use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{CompanyId, Entity, ProductId, StockMoveId, ValueObject};

use crate::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveState {
    Draft,
    Waiting,
    Assigned,
    Done,
    Cancel,
}

/// Which way a move changes a company's valued stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    /// Into valued stock (receipts, positive adjustments).
    Incoming,
    /// Out of valued stock (deliveries, scrap, consumption).
    Outgoing,
}

/// A stock transfer and the valuation posted for it.
///
/// `value` is signed: positive for incoming moves, negative for outgoing ones.
/// `remaining_qty` / `remaining_value` are the unconsumed part of the move
/// when it acts as a FIFO receipt layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: StockMoveId,
    pub product_id: ProductId,
    pub company_id: CompanyId,
    pub location_src: Location,
    pub location_dest: Location,
    pub state: MoveState,
    pub date: DateTime<Utc>,
    pub price_unit: Decimal,
    pub value: Decimal,
    pub remaining_qty: Decimal,
    pub remaining_value: Decimal,
}

impl StockMove {
    /// Move direction relative to the move's company, or `None` for moves that
    /// stay inside (or outside) valued stock.
    pub fn direction(&self) -> Option<MoveDirection> {
        let from_valued = self.location_src.is_valued_for(self.company_id);
        let to_valued = self.location_dest.is_valued_for(self.company_id);
        match (from_valued, to_valued) {
            (false, true) => Some(MoveDirection::Incoming),
            (true, false) => Some(MoveDirection::Outgoing),
            _ => None,
        }
    }

    pub fn is_in(&self) -> bool {
        self.direction() == Some(MoveDirection::Incoming)
    }

    pub fn is_out(&self) -> bool {
        self.direction() == Some(MoveDirection::Outgoing)
    }

    pub fn is_done(&self) -> bool {
        self.state == MoveState::Done
    }

    /// Search domain for the receipts this move can draw from or give back to.
    pub fn receipt_domain(&self) -> ReceiptDomain {
        ReceiptDomain {
            product_id: self.product_id,
            company_id: self.company_id,
        }
    }
}

impl Entity for StockMove {
    type Id = StockMoveId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Filter for FIFO receipt candidates: done incoming moves of the same product
/// and company with quantity left in their layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDomain {
    pub product_id: ProductId,
    pub company_id: CompanyId,
}

impl ValueObject for ReceiptDomain {}

impl ReceiptDomain {
    pub fn matches(&self, candidate: &StockMove) -> bool {
        candidate.product_id == self.product_id
            && candidate.company_id == self.company_id
            && candidate.is_done()
            && candidate.is_in()
            && candidate.remaining_qty > Decimal::ZERO
    }
}

/// Valuation fields to rewrite on a move; `None` leaves the field alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveValuationUpdate {
    pub value: Option<Decimal>,
    pub remaining_qty: Option<Decimal>,
    pub remaining_value: Option<Decimal>,
}

impl ValueObject for MoveValuationUpdate {}

impl MoveValuationUpdate {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.remaining_qty.is_none() && self.remaining_value.is_none()
    }

    pub fn apply_to(&self, mv: &mut StockMove) {
        if let Some(value) = self.value {
            mv.value = value;
        }
        if let Some(qty) = self.remaining_qty {
            mv.remaining_qty = qty;
        }
        if let Some(value) = self.remaining_value {
            mv.remaining_value = value;
        }
    }
}
