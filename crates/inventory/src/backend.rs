//! Host collaborators the revaluation calls into.
//!
//! Every trait is object safe so policies can work against
//! `&mut dyn StockBackend`. Errors are the host's and are propagated as is.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{
    CompanyContext, CompanyId, DomainResult, MoveLineId, ProductId, StockMoveId, ValueObject,
};
use stockcost_products::ProductCosting;

use crate::move_line::{MoveLine, MoveLineWrite};
use crate::stock_move::{MoveValuationUpdate, ReceiptDomain, StockMove};

/// Company-scoped costing configuration of a product variant.
pub trait ProductCatalog {
    fn costing(&self, product_id: ProductId, company_id: CompanyId) -> DomainResult<ProductCosting>;
}

pub trait MoveStore {
    fn get_move(&self, move_id: StockMoveId) -> DomainResult<StockMove>;

    fn write_move(
        &mut self,
        move_id: StockMoveId,
        update: &MoveValuationUpdate,
    ) -> DomainResult<()>;

    /// Most recent receipt matching `domain` (by date, then id, both
    /// descending), if any.
    fn search_receipt_candidate(&self, domain: &ReceiptDomain) -> DomainResult<Option<StockMove>>;
}

pub trait MoveLineStore {
    fn get_lines(&self, line_ids: &[MoveLineId]) -> DomainResult<Vec<MoveLine>>;

    /// Base write of the requested fields, without any revaluation.
    fn write_lines(&mut self, line_ids: &[MoveLineId], write: &MoveLineWrite) -> DomainResult<()>;
}

pub trait FifoConsumer {
    /// Consume `quantity` more units for an outgoing move from the available
    /// receipt layers and return the consumed value (positive).
    ///
    /// Layer bookkeeping on the consumed receipts is the implementor's job.
    fn run_fifo(&mut self, mv: &StockMove, quantity: Decimal) -> DomainResult<Decimal>;
}

/// Amounts forced onto the accounting-entry generator instead of letting it
/// derive them from the move's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntryOverrides {
    pub force_valuation_amount: Decimal,
    pub forced_quantity: Decimal,
}

impl ValueObject for AccountEntryOverrides {}

pub trait AccountingHooks {
    fn account_entry_move(
        &mut self,
        ctx: &CompanyContext,
        mv: &StockMove,
        overrides: AccountEntryOverrides,
    ) -> DomainResult<()>;

    /// Propagate `forced_qty` additional units into the product's price (e.g.
    /// the running average).
    fn product_price_update_before_done(
        &mut self,
        ctx: &CompanyContext,
        mv: &StockMove,
        forced_qty: Decimal,
    ) -> DomainResult<()>;
}

/// Everything the move-line revaluation needs from its host.
pub trait StockBackend:
    ProductCatalog + MoveStore + MoveLineStore + FifoConsumer + AccountingHooks
{
}

impl<T> StockBackend for T where
    T: ProductCatalog + MoveStore + MoveLineStore + FifoConsumer + AccountingHooks
{
}
