//! Revaluation of done moves when their move lines' done quantity is edited.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{CompanyContext, CompanyId, DomainResult, MoveLineId, ProductId, StockMoveId};
use stockcost_events::{Event, EventEnvelope};
use stockcost_products::CostMethod;

use crate::backend::{AccountEntryOverrides, StockBackend};
use crate::move_line::MoveLineWrite;
use crate::policy::policy_for;
use crate::stock_move::{MoveDirection, MoveState, StockMove};

/// Command: write `write` on the given move lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMoveLines {
    pub line_ids: Vec<MoveLineId>,
    pub write: MoveLineWrite,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MoveRevalued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRevalued {
    pub company_id: CompanyId,
    pub move_id: StockMoveId,
    pub product_id: ProductId,
    pub cost_method: CostMethod,
    pub direction: MoveDirection,
    pub qty_difference: Decimal,
    pub correction_value: Decimal,
    pub value_before: Decimal,
    pub value_after: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReceiptLayerRestored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLayerRestored {
    pub company_id: CompanyId,
    pub receipt_id: StockMoveId,
    pub returned_by: StockMoveId,
    pub qty: Decimal,
    pub value: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationEvent {
    MoveRevalued(MoveRevalued),
    ReceiptLayerRestored(ReceiptLayerRestored),
}

impl Event for ValuationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ValuationEvent::MoveRevalued(_) => "stock.move.revalued",
            ValuationEvent::ReceiptLayerRestored(_) => "stock.move.receipt_layer_restored",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ValuationEvent::MoveRevalued(e) => e.occurred_at,
            ValuationEvent::ReceiptLayerRestored(e) => e.occurred_at,
        }
    }
}

/// Facts produced by one [`write_move_lines`] call, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevaluationOutcome {
    pub events: Vec<ValuationEvent>,
}

impl RevaluationOutcome {
    pub fn revalued_moves(&self) -> impl Iterator<Item = &MoveRevalued> {
        self.events.iter().filter_map(|e| match e {
            ValuationEvent::MoveRevalued(r) => Some(r),
            ValuationEvent::ReceiptLayerRestored(_) => None,
        })
    }

    pub fn into_envelopes(self, ctx: &CompanyContext) -> Vec<EventEnvelope<ValuationEvent>> {
        EventEnvelope::seal_all(ctx, self.events)
    }
}

/// A move touched by the edit and its accumulated done-quantity change.
struct PendingMove {
    mv: StockMove,
    direction: MoveDirection,
    qty_difference: Decimal,
}

/// Write move lines, revaluing their done moves first when `qty_done` changes.
///
/// Lines that are not done, or whose move is neither incoming nor outgoing,
/// are written without revaluation. The base write always covers every
/// requested line and happens last.
pub fn write_move_lines<B: StockBackend>(
    backend: &mut B,
    ctx: &CompanyContext,
    cmd: &EditMoveLines,
) -> DomainResult<RevaluationOutcome> {
    let mut outcome = RevaluationOutcome::default();

    if let Some(new_qty_done) = cmd.write.qty_done {
        for pending in pending_moves(backend, &cmd.line_ids, new_qty_done)? {
            revalue_move(backend, ctx, pending, cmd.occurred_at, &mut outcome)?;
        }
    }

    backend.write_lines(&cmd.line_ids, &cmd.write)?;
    Ok(outcome)
}

/// Group the done, stock-affecting lines by move, summing their changes and
/// keeping first-seen order.
fn pending_moves<B: StockBackend>(
    backend: &B,
    line_ids: &[MoveLineId],
    new_qty_done: Decimal,
) -> DomainResult<Vec<PendingMove>> {
    let mut pending: Vec<PendingMove> = Vec::new();

    for line in backend.get_lines(line_ids)? {
        if line.state != MoveState::Done {
            continue;
        }
        let qty_difference = new_qty_done - line.qty_done;

        if let Some(existing) = pending.iter_mut().find(|p| p.mv.id == line.move_id) {
            existing.qty_difference += qty_difference;
            continue;
        }

        let mv = backend.get_move(line.move_id)?;
        let Some(direction) = mv.direction().filter(|_| mv.is_done()) else {
            tracing::debug!(
                line_id = %line.id,
                move_id = %mv.id,
                "move is not a done receipt or delivery; no revaluation"
            );
            continue;
        };
        pending.push(PendingMove {
            mv,
            direction,
            qty_difference,
        });
    }

    Ok(pending)
}

fn revalue_move<B: StockBackend>(
    backend: &mut B,
    ctx: &CompanyContext,
    pending: PendingMove,
    occurred_at: DateTime<Utc>,
    outcome: &mut RevaluationOutcome,
) -> DomainResult<()> {
    let PendingMove {
        mv,
        direction,
        qty_difference,
    } = pending;

    if qty_difference.is_zero() {
        tracing::debug!(move_id = %mv.id, "done quantity unchanged; nothing to revalue");
        return Ok(());
    }

    let costing = backend.costing(mv.product_id, ctx.company_id)?;
    let policy = policy_for(costing.cost_method);
    let reval = policy.revalue(&mut *backend, &mv, direction, &costing, qty_difference)?;

    if !reval.update.is_empty() {
        backend.write_move(mv.id, &reval.update)?;
    }
    let mut revalued = mv.clone();
    reval.update.apply_to(&mut revalued);

    tracing::info!(
        move_id = %mv.id,
        cost_method = %costing.cost_method,
        policy = policy.name(),
        ?direction,
        %qty_difference,
        correction_value = %reval.correction_value,
        value_before = %mv.value,
        value_after = %revalued.value,
        "revalued done move"
    );

    if costing.valuation.is_real_time() {
        backend.account_entry_move(
            ctx,
            &revalued,
            AccountEntryOverrides {
                force_valuation_amount: reval.correction_value,
                forced_quantity: qty_difference,
            },
        )?;
    }
    if qty_difference > Decimal::ZERO {
        backend.product_price_update_before_done(ctx, &revalued, qty_difference)?;
    }

    outcome.events.push(ValuationEvent::MoveRevalued(MoveRevalued {
        company_id: ctx.company_id,
        move_id: mv.id,
        product_id: mv.product_id,
        cost_method: costing.cost_method,
        direction,
        qty_difference,
        correction_value: reval.correction_value,
        value_before: mv.value,
        value_after: revalued.value,
        occurred_at,
    }));
    if let Some(layer) = reval.restored_layer {
        outcome
            .events
            .push(ValuationEvent::ReceiptLayerRestored(ReceiptLayerRestored {
                company_id: ctx.company_id,
                receipt_id: layer.receipt_id,
                returned_by: mv.id,
                qty: layer.qty,
                value: layer.value,
                occurred_at,
            }));
    }

    Ok(())
}
