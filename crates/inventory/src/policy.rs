//! Revaluation policies, one per costing family.
//!
//! `standard`, `average` and `last` all value corrections at today's standard
//! price; `fifo` works against receipt layers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{DomainError, DomainResult, StockMoveId};
use stockcost_products::{CostMethod, ProductCosting};

use crate::backend::StockBackend;
use crate::stock_move::{MoveDirection, MoveValuationUpdate, StockMove};

/// Outcome of revaluing one move for a done-quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revaluation {
    /// Fields to write on the revalued move.
    pub update: MoveValuationUpdate,
    /// Unsigned correction: added to incoming values, subtracted from outgoing.
    pub correction_value: Decimal,
    /// Receipt layer that took back returned units, if any.
    pub restored_layer: Option<RestoredLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredLayer {
    pub receipt_id: StockMoveId,
    pub qty: Decimal,
    pub value: Decimal,
}

pub trait RevaluationPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Work out the valuation correction of `mv` for a done-quantity change of
    /// `qty_difference`. Side effects on other records (layer consumption,
    /// restoring a receipt) happen through `backend`; the returned update for
    /// `mv` itself is left to the caller to persist.
    fn revalue(
        &self,
        backend: &mut dyn StockBackend,
        mv: &StockMove,
        direction: MoveDirection,
        costing: &ProductCosting,
        qty_difference: Decimal,
    ) -> DomainResult<Revaluation>;
}

/// `standard`, `average`, `last`: correct by the current standard price.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPricePolicy;

impl RevaluationPolicy for StandardPricePolicy {
    fn name(&self) -> &'static str {
        "standard_price"
    }

    fn revalue(
        &self,
        _backend: &mut dyn StockBackend,
        mv: &StockMove,
        direction: MoveDirection,
        costing: &ProductCosting,
        qty_difference: Decimal,
    ) -> DomainResult<Revaluation> {
        let correction_value = mul(qty_difference, costing.standard_price)?;
        let value = match direction {
            MoveDirection::Incoming => add(mv.value, correction_value)?,
            MoveDirection::Outgoing => sub(mv.value, correction_value)?,
        };
        Ok(Revaluation {
            update: MoveValuationUpdate {
                value: Some(value),
                ..MoveValuationUpdate::default()
            },
            correction_value,
            restored_layer: None,
        })
    }
}

/// `fifo`: receipts correct their own layer at their unit price; deliveries
/// consume more layers or hand units back to the latest receipt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoPolicy;

impl FifoPolicy {
    fn revalue_incoming(mv: &StockMove, qty_difference: Decimal) -> DomainResult<Revaluation> {
        let correction_value = mul(qty_difference, mv.price_unit)?;
        Ok(Revaluation {
            update: MoveValuationUpdate {
                value: Some(add(mv.value, correction_value)?),
                remaining_qty: Some(add(mv.remaining_qty, qty_difference)?),
                remaining_value: Some(add(mv.remaining_value, correction_value)?),
            },
            correction_value,
            restored_layer: None,
        })
    }

    fn return_to_latest_receipt(
        backend: &mut dyn StockBackend,
        mv: &StockMove,
        costing: &ProductCosting,
        qty_difference: Decimal,
    ) -> DomainResult<(Decimal, Option<RestoredLayer>)> {
        let Some(receipt) = backend.search_receipt_candidate(&mv.receipt_domain())? else {
            tracing::debug!(
                move_id = %mv.id,
                standard_price = %costing.standard_price,
                "no receipt candidate; valuing returned units at standard price"
            );
            return Ok((mul(qty_difference, costing.standard_price)?, None));
        };

        let returned_qty = -qty_difference;
        let returned_value = mul(returned_qty, receipt.price_unit)?;
        let update = MoveValuationUpdate {
            value: None,
            remaining_qty: Some(add(receipt.remaining_qty, returned_qty)?),
            remaining_value: Some(add(receipt.remaining_value, returned_value)?),
        };
        backend.write_move(receipt.id, &update)?;
        tracing::debug!(
            move_id = %mv.id,
            receipt_id = %receipt.id,
            %returned_qty,
            %returned_value,
            "returned units to receipt layer"
        );

        Ok((
            mul(qty_difference, receipt.price_unit)?,
            Some(RestoredLayer {
                receipt_id: receipt.id,
                qty: returned_qty,
                value: returned_value,
            }),
        ))
    }
}

impl RevaluationPolicy for FifoPolicy {
    fn name(&self) -> &'static str {
        "fifo"
    }

    fn revalue(
        &self,
        backend: &mut dyn StockBackend,
        mv: &StockMove,
        direction: MoveDirection,
        costing: &ProductCosting,
        qty_difference: Decimal,
    ) -> DomainResult<Revaluation> {
        if direction == MoveDirection::Incoming {
            return Self::revalue_incoming(mv, qty_difference);
        }

        let (correction_value, restored_layer) = if qty_difference > Decimal::ZERO {
            // run_fifo maintains the consumed layers itself.
            (backend.run_fifo(mv, qty_difference)?, None)
        } else if qty_difference < Decimal::ZERO {
            Self::return_to_latest_receipt(backend, mv, costing, qty_difference)?
        } else {
            return Ok(Revaluation {
                update: MoveValuationUpdate::default(),
                correction_value: Decimal::ZERO,
                restored_layer: None,
            });
        };

        Ok(Revaluation {
            update: MoveValuationUpdate {
                value: Some(sub(mv.value, correction_value)?),
                ..MoveValuationUpdate::default()
            },
            correction_value,
            restored_layer,
        })
    }
}

fn overflow(op: char, a: Decimal, b: Decimal) -> DomainError {
    DomainError::invariant(format!("valuation overflow ({a} {op} {b})"))
}

fn mul(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow('*', a, b))
}

fn add(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b).ok_or_else(|| overflow('+', a, b))
}

fn sub(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow('-', a, b))
}

static STANDARD_PRICE: StandardPricePolicy = StandardPricePolicy;
static FIFO: FifoPolicy = FifoPolicy;

/// Policy that revalues moves of products using `method`.
pub fn policy_for(method: CostMethod) -> &'static dyn RevaluationPolicy {
    match method {
        CostMethod::Standard | CostMethod::Average | CostMethod::Last => &STANDARD_PRICE,
        CostMethod::Fifo => &FIFO,
    }
}
