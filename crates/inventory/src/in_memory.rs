//! In-memory stock backend.
//!
//! Implements every collaborator the revaluation and the cost-method
//! transition need, for tests and embedding. Not thread-safe; wrap it if you
//! need sharing.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use stockcost_core::{
    CompanyContext, CompanyId, DomainError, DomainResult, MoveLineId, ProductId,
    ProductTemplateId, QuantityScope, StockMoveId,
};
use stockcost_products::{CostMethod, ProductCosting, ProductTemplate, StockValuationSource};

use crate::backend::{
    AccountEntryOverrides, AccountingHooks, FifoConsumer, MoveLineStore, MoveStore,
    ProductCatalog,
};
use crate::move_line::{MoveLine, MoveLineWrite};
use crate::stock_move::{MoveValuationUpdate, ReceiptDomain, StockMove};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAccountEntry {
    pub move_id: StockMoveId,
    pub company_id: CompanyId,
    pub overrides: AccountEntryOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPriceUpdate {
    pub move_id: StockMoveId,
    pub forced_qty: Decimal,
    pub standard_price_before: Decimal,
    pub standard_price_after: Decimal,
}

#[derive(Debug, Default)]
pub struct InMemoryStock {
    templates: HashMap<ProductTemplateId, ProductTemplate>,
    variant_templates: HashMap<ProductId, ProductTemplateId>,
    moves: BTreeMap<StockMoveId, StockMove>,
    lines: BTreeMap<MoveLineId, MoveLine>,
    fifo_runs: Vec<(StockMoveId, Decimal)>,
    account_entries: Vec<RecordedAccountEntry>,
    price_updates: Vec<RecordedPriceUpdate>,
    accounting_failure: Option<String>,
}

impl InMemoryStock {
    pub fn insert_template(&mut self, template: ProductTemplate) {
        for variant_id in template.variant_ids() {
            self.variant_templates.insert(*variant_id, template.id_typed());
        }
        self.templates.insert(template.id_typed(), template);
    }

    pub fn insert_move(&mut self, mv: StockMove) {
        self.moves.insert(mv.id, mv);
    }

    pub fn insert_line(&mut self, line: MoveLine) {
        self.lines.insert(line.id, line);
    }

    /// Make every accounting-entry call fail with `message`.
    pub fn fail_accounting_with(&mut self, message: impl Into<String>) {
        self.accounting_failure = Some(message.into());
    }

    pub fn template(&self, template_id: ProductTemplateId) -> Option<&ProductTemplate> {
        self.templates.get(&template_id)
    }

    pub fn template_mut(&mut self, template_id: ProductTemplateId) -> Option<&mut ProductTemplate> {
        self.templates.get_mut(&template_id)
    }

    pub fn move_by_id(&self, move_id: StockMoveId) -> Option<&StockMove> {
        self.moves.get(&move_id)
    }

    pub fn line_by_id(&self, line_id: MoveLineId) -> Option<&MoveLine> {
        self.lines.get(&line_id)
    }

    /// `(move, quantity)` for every `run_fifo` call, in call order.
    pub fn fifo_runs(&self) -> &[(StockMoveId, Decimal)] {
        &self.fifo_runs
    }

    pub fn account_entries(&self) -> &[RecordedAccountEntry] {
        &self.account_entries
    }

    pub fn price_updates(&self) -> &[RecordedPriceUpdate] {
        &self.price_updates
    }

    fn template_of(&self, product_id: ProductId) -> DomainResult<&ProductTemplate> {
        self.variant_templates
            .get(&product_id)
            .and_then(|id| self.templates.get(id))
            .ok_or_else(|| DomainError::not_found(format!("product {product_id}")))
    }

    fn template_id_of(&self, product_id: ProductId) -> DomainResult<ProductTemplateId> {
        Ok(self.template_of(product_id)?.id_typed())
    }

    /// Done quantity of a move: the sum of its lines.
    fn move_quantity(&self, move_id: StockMoveId) -> Decimal {
        self.lines
            .values()
            .filter(|l| l.move_id == move_id)
            .map(|l| l.qty_done)
            .sum()
    }

    fn receipts_oldest_first(&self, domain: &ReceiptDomain) -> Vec<StockMoveId> {
        let mut receipts: Vec<&StockMove> =
            self.moves.values().filter(|m| domain.matches(m)).collect();
        receipts.sort_by_key(|m| (m.date, m.id));
        receipts.into_iter().map(|m| m.id).collect()
    }
}

impl ProductCatalog for InMemoryStock {
    fn costing(
        &self,
        product_id: ProductId,
        company_id: CompanyId,
    ) -> DomainResult<ProductCosting> {
        Ok(self.template_of(product_id)?.costing(company_id))
    }
}

impl MoveStore for InMemoryStock {
    fn get_move(&self, move_id: StockMoveId) -> DomainResult<StockMove> {
        self.moves
            .get(&move_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("stock move {move_id}")))
    }

    fn write_move(
        &mut self,
        move_id: StockMoveId,
        update: &MoveValuationUpdate,
    ) -> DomainResult<()> {
        let mv = self
            .moves
            .get_mut(&move_id)
            .ok_or_else(|| DomainError::not_found(format!("stock move {move_id}")))?;
        update.apply_to(mv);
        Ok(())
    }

    fn search_receipt_candidate(&self, domain: &ReceiptDomain) -> DomainResult<Option<StockMove>> {
        Ok(self
            .moves
            .values()
            .filter(|m| domain.matches(m))
            .max_by_key(|m| (m.date, m.id))
            .cloned())
    }
}

impl MoveLineStore for InMemoryStock {
    fn get_lines(&self, line_ids: &[MoveLineId]) -> DomainResult<Vec<MoveLine>> {
        line_ids
            .iter()
            .map(|id| {
                self.lines
                    .get(id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found(format!("move line {id}")))
            })
            .collect()
    }

    fn write_lines(&mut self, line_ids: &[MoveLineId], write: &MoveLineWrite) -> DomainResult<()> {
        // Validate everything first so a missing line writes nothing.
        if let Some(missing) = line_ids.iter().find(|id| !self.lines.contains_key(*id)) {
            return Err(DomainError::not_found(format!("move line {missing}")));
        }
        for id in line_ids {
            if let Some(line) = self.lines.get_mut(id) {
                write.apply_to(line);
            }
        }
        Ok(())
    }
}

impl FifoConsumer for InMemoryStock {
    fn run_fifo(&mut self, mv: &StockMove, quantity: Decimal) -> DomainResult<Decimal> {
        self.fifo_runs.push((mv.id, quantity));

        let mut to_take = quantity;
        let mut consumed_value = Decimal::ZERO;
        let mut last_unit_cost = None;

        for receipt_id in self.receipts_oldest_first(&mv.receipt_domain()) {
            if to_take <= Decimal::ZERO {
                break;
            }
            let Some(receipt) = self.moves.get_mut(&receipt_id) else {
                continue;
            };
            let unit_cost = receipt.remaining_value / receipt.remaining_qty;
            let taken = to_take.min(receipt.remaining_qty);
            // Emptying a layer takes its exact remaining value.
            let taken_value = if taken == receipt.remaining_qty {
                receipt.remaining_value
            } else {
                taken * unit_cost
            };

            receipt.remaining_qty -= taken;
            receipt.remaining_value -= taken_value;
            consumed_value += taken_value;
            to_take -= taken;
            last_unit_cost = Some(unit_cost);
        }

        if to_take > Decimal::ZERO {
            let unit_cost = match last_unit_cost {
                Some(cost) => cost,
                None => self
                    .template_of(mv.product_id)?
                    .standard_price(mv.company_id),
            };
            tracing::warn!(
                move_id = %mv.id,
                missing_qty = %to_take,
                %unit_cost,
                "not enough receipt layers; valuing the rest at last known cost"
            );
            consumed_value += to_take * unit_cost;
        }

        Ok(consumed_value)
    }
}

impl AccountingHooks for InMemoryStock {
    fn account_entry_move(
        &mut self,
        ctx: &CompanyContext,
        mv: &StockMove,
        overrides: AccountEntryOverrides,
    ) -> DomainResult<()> {
        if let Some(message) = &self.accounting_failure {
            return Err(DomainError::collaborator(message.clone()));
        }
        self.account_entries.push(RecordedAccountEntry {
            move_id: mv.id,
            company_id: ctx.company_id,
            overrides,
        });
        Ok(())
    }

    fn product_price_update_before_done(
        &mut self,
        ctx: &CompanyContext,
        mv: &StockMove,
        forced_qty: Decimal,
    ) -> DomainResult<()> {
        let template_id = self.template_id_of(mv.product_id)?;
        let on_hand = self.qty_available(template_id, ctx.company_owned())?;

        let Some(template) = self.templates.get_mut(&template_id) else {
            return Err(DomainError::not_found(format!("product template {template_id}")));
        };
        let before = template.standard_price(ctx.company_id);

        if mv.is_in() {
            match template.cost_method(ctx.company_id) {
                CostMethod::Average => {
                    let new_price = if on_hand <= Decimal::ZERO {
                        mv.price_unit
                    } else {
                        (on_hand * before + forced_qty * mv.price_unit) / (on_hand + forced_qty)
                    };
                    template.set_standard_price(ctx.company_id, new_price);
                }
                CostMethod::Last => {
                    template.apply_purchase_price(ctx.company_id, mv.price_unit);
                }
                CostMethod::Standard | CostMethod::Fifo => {}
            }
        }

        self.price_updates.push(RecordedPriceUpdate {
            move_id: mv.id,
            forced_qty,
            standard_price_before: before,
            standard_price_after: template.standard_price(ctx.company_id),
        });
        Ok(())
    }
}

impl StockValuationSource for InMemoryStock {
    fn sum_remaining_values(
        &self,
        variant_id: ProductId,
        company_id: CompanyId,
    ) -> DomainResult<Decimal> {
        Ok(self
            .moves
            .values()
            .filter(|m| {
                m.product_id == variant_id
                    && m.company_id == company_id
                    && m.is_done()
                    && m.is_in()
            })
            .map(|m| m.remaining_value)
            .sum())
    }

    fn qty_available(
        &self,
        template_id: ProductTemplateId,
        scope: QuantityScope,
    ) -> DomainResult<Decimal> {
        let template = self
            .templates
            .get(&template_id)
            .ok_or_else(|| DomainError::not_found(format!("product template {template_id}")))?;

        let mut qty = Decimal::ZERO;
        for mv in self.moves.values().filter(|m| {
            m.is_done()
                && scope.includes(m.company_id)
                && template.variant_ids().contains(&m.product_id)
        }) {
            if mv.is_in() {
                qty += self.move_quantity(mv.id);
            } else if mv.is_out() {
                qty -= self.move_quantity(mv.id);
            }
        }
        Ok(qty)
    }
}
