//! Costing-method transitions.
//!
//! Leaving FIFO for a standard-price method (`average`, `standard`, `last`)
//! reprices the product at the weighted average of what is still in stock, so
//! valuation does not jump when receipt layers stop being used.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{
    CompanyContext, CompanyId, DomainError, DomainResult, ProductId, ProductTemplateId,
    QuantityScope,
};
use stockcost_events::Event;

use crate::cost_method::CostMethod;
use crate::product::ProductTemplate;

/// Stock figures the transition reads from the host.
pub trait StockValuationSource {
    /// Value still sitting in the variant's unconsumed FIFO layers owned by
    /// `company_id`.
    fn sum_remaining_values(
        &self,
        variant_id: ProductId,
        company_id: CompanyId,
    ) -> DomainResult<Decimal>;

    /// On-hand quantity of every variant of the template within `scope`.
    fn qty_available(
        &self,
        template_id: ProductTemplateId,
        scope: QuantityScope,
    ) -> DomainResult<Decimal>;
}

/// Command: an operator picked a new costing method for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCostMethod {
    pub template_id: ProductTemplateId,
    pub new_method: CostMethod,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CostMethodChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMethodChanged {
    pub company_id: CompanyId,
    pub template_id: ProductTemplateId,
    pub from: CostMethod,
    pub to: CostMethod,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StandardPriceUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardPriceUpdated {
    pub company_id: CompanyId,
    pub template_id: ProductTemplateId,
    pub previous: Decimal,
    pub standard_price: Decimal,
    pub valuation: Decimal,
    pub qty_available: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    StandardPriceUpdated(StandardPriceUpdated),
    CostMethodChanged(CostMethodChanged),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::StandardPriceUpdated(_) => "products.template.standard_price_updated",
            ProductEvent::CostMethodChanged(_) => "products.template.cost_method_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::StandardPriceUpdated(e) => e.occurred_at,
            ProductEvent::CostMethodChanged(e) => e.occurred_at,
        }
    }
}

/// Persist a new costing method for the company in `ctx`.
///
/// When the persisted method is `fifo` and the new one prices from the standard
/// price, the standard price is first set to the company's remaining layer
/// value divided by its company-owned on-hand quantity. A zero quantity leaves the price as is.
/// The method is written in every case.
pub fn set_cost_method<S>(
    template: &mut ProductTemplate,
    ctx: &CompanyContext,
    cmd: &ChangeCostMethod,
    stock: &S,
) -> DomainResult<Vec<ProductEvent>>
where
    S: StockValuationSource + ?Sized,
{
    if template.id_typed() != cmd.template_id {
        return Err(DomainError::invariant("template_id mismatch"));
    }

    let company_id = ctx.company_id;
    let current = template.cost_method(company_id);
    let mut events = Vec::with_capacity(2);

    if current == CostMethod::Fifo && cmd.new_method.prices_from_standard() {
        let mut valuation = Decimal::ZERO;
        for variant_id in template.variant_ids() {
            valuation += stock.sum_remaining_values(*variant_id, company_id)?;
        }
        let qty_available = stock.qty_available(template.id_typed(), ctx.company_owned())?;

        if qty_available.is_zero() {
            tracing::debug!(
                template_id = %template.id_typed(),
                company_id = %company_id,
                %valuation,
                "nothing on hand; standard price left unchanged"
            );
        } else {
            let standard_price = valuation.checked_div(qty_available).ok_or_else(|| {
                DomainError::invariant(format!(
                    "standard price overflow ({valuation} / {qty_available})"
                ))
            })?;
            let previous = template.standard_price(company_id);
            template.set_standard_price(company_id, standard_price);

            tracing::info!(
                template_id = %template.id_typed(),
                company_id = %company_id,
                %previous,
                %standard_price,
                %valuation,
                %qty_available,
                "repriced product leaving fifo"
            );
            events.push(ProductEvent::StandardPriceUpdated(StandardPriceUpdated {
                company_id,
                template_id: template.id_typed(),
                previous,
                standard_price,
                valuation,
                qty_available,
                occurred_at: cmd.occurred_at,
            }));
        }
    }

    template.write_cost_method(company_id, cmd.new_method);
    events.push(ProductEvent::CostMethodChanged(CostMethodChanged {
        company_id,
        template_id: template.id_typed(),
        from: current,
        to: cmd.new_method,
        occurred_at: cmd.occurred_at,
    }));

    Ok(events)
}
