use serde::{Deserialize, Serialize};

use stockcost_core::{CompanyId, LocationId};

/// What a location represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationUsage {
    Supplier,
    View,
    Internal,
    Customer,
    Inventory,
    Production,
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub usage: LocationUsage,
    /// Owning company; partner and virtual locations are shared (`None`).
    pub company_id: Option<CompanyId>,
}

impl Location {
    pub fn new(usage: LocationUsage, company_id: Option<CompanyId>) -> Self {
        Self {
            id: LocationId::new(),
            usage,
            company_id,
        }
    }

    pub fn internal(company_id: CompanyId) -> Self {
        Self::new(LocationUsage::Internal, Some(company_id))
    }

    pub fn supplier() -> Self {
        Self::new(LocationUsage::Supplier, None)
    }

    pub fn customer() -> Self {
        Self::new(LocationUsage::Customer, None)
    }

    /// Whether stock held here counts in `company_id`'s valuation.
    pub fn is_valued_for(&self, company_id: CompanyId) -> bool {
        self.usage == LocationUsage::Internal && self.company_id == Some(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_own_internal_locations_are_valued() {
        let company = CompanyId::new();
        assert!(Location::internal(company).is_valued_for(company));
        assert!(!Location::internal(CompanyId::new()).is_valued_for(company));
        assert!(!Location::supplier().is_valued_for(company));
        assert!(!Location::new(LocationUsage::Transit, Some(company)).is_valued_for(company));
    }
}
