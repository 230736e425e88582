use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{CompanyId, Entity, ProductId, ProductTemplateId, ValueObject};

use crate::cost_method::{CostMethod, ValuationMode};
use crate::property::CompanyProperty;
use crate::settings::CostingSettings;

/// Product template: owner of the costing configuration shared by its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTemplate {
    id: ProductTemplateId,
    name: String,
    variant_ids: Vec<ProductId>,
    cost_method: CompanyProperty<CostMethod>,
    standard_price: CompanyProperty<Decimal>,
    valuation: ValuationMode,
}

/// Snapshot of how one company values a product, as the move revaluation
/// needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCosting {
    pub template_id: ProductTemplateId,
    pub cost_method: CostMethod,
    pub standard_price: Decimal,
    pub valuation: ValuationMode,
}

impl ValueObject for ProductCosting {}

impl ProductTemplate {
    pub fn new(id: ProductTemplateId, name: impl Into<String>, settings: &CostingSettings) -> Self {
        Self {
            id,
            name: name.into(),
            variant_ids: Vec::new(),
            cost_method: CompanyProperty::new(settings.default_cost_method),
            standard_price: CompanyProperty::new(Decimal::ZERO),
            valuation: settings.default_valuation,
        }
    }

    pub fn with_variant(mut self, variant_id: ProductId) -> Self {
        self.add_variant(variant_id);
        self
    }

    pub fn add_variant(&mut self, variant_id: ProductId) {
        if !self.variant_ids.contains(&variant_id) {
            self.variant_ids.push(variant_id);
        }
    }

    pub fn id_typed(&self) -> ProductTemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant_ids(&self) -> &[ProductId] {
        &self.variant_ids
    }

    pub fn cost_method(&self, company_id: CompanyId) -> CostMethod {
        *self.cost_method.get(company_id)
    }

    pub fn standard_price(&self, company_id: CompanyId) -> Decimal {
        *self.standard_price.get(company_id)
    }

    pub fn valuation(&self) -> ValuationMode {
        self.valuation
    }

    pub fn set_valuation(&mut self, valuation: ValuationMode) {
        self.valuation = valuation;
    }

    pub fn set_standard_price(&mut self, company_id: CompanyId, price: Decimal) {
        self.standard_price.set(company_id, price);
    }

    /// Plain write of the company's cost method, without repricing.
    ///
    /// Operator-driven changes go through [`crate::set_cost_method`].
    pub fn write_cost_method(&mut self, company_id: CompanyId, method: CostMethod) {
        self.cost_method.set(company_id, method);
    }

    pub fn costing(&self, company_id: CompanyId) -> ProductCosting {
        ProductCosting {
            template_id: self.id,
            cost_method: self.cost_method(company_id),
            standard_price: self.standard_price(company_id),
            valuation: self.valuation,
        }
    }

    /// Copy of this template under a new id.
    ///
    /// Costing configuration (every company's method and standard price) is
    /// carried over; variants are not, the copy gets its own.
    pub fn duplicate(&self, new_id: ProductTemplateId) -> Self {
        Self {
            id: new_id,
            name: format!("{} (copy)", self.name),
            variant_ids: Vec::new(),
            cost_method: self.cost_method.clone(),
            standard_price: self.standard_price.clone(),
            valuation: self.valuation,
        }
    }

    /// Record a purchase price for the company.
    ///
    /// Under "Last Purchase Price" costing the standard price follows the most
    /// recent purchase; other methods ignore it. Returns the previous price when
    /// it was replaced.
    pub fn apply_purchase_price(
        &mut self,
        company_id: CompanyId,
        price_unit: Decimal,
    ) -> Option<Decimal> {
        if self.cost_method(company_id) != CostMethod::Last {
            return None;
        }
        let previous = self.standard_price(company_id);
        self.set_standard_price(company_id, price_unit);
        tracing::debug!(
            template_id = %self.id,
            company_id = %company_id,
            %previous,
            %price_unit,
            "standard price follows last purchase price"
        );
        Some(previous)
    }
}

impl Entity for ProductTemplate {
    type Id = ProductTemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
