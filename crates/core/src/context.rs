//! Explicit company scope threaded through costing calls.

use serde::{Deserialize, Serialize};

use crate::id::CompanyId;
use crate::value_object::ValueObject;

/// The company on whose behalf a costing operation runs.
///
/// Company-dependent properties (cost method, standard price) are resolved
/// against this scope; nothing is read from ambient state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyContext {
    pub company_id: CompanyId,
}

impl CompanyContext {
    pub fn new(company_id: CompanyId) -> Self {
        Self { company_id }
    }

    /// Quantity scope limited to stock owned by this company.
    pub fn company_owned(&self) -> QuantityScope {
        QuantityScope::CompanyOwned(self.company_id)
    }
}

impl ValueObject for CompanyContext {}

/// Which stock counts when asking for an on-hand quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityScope {
    /// Every company's stock.
    AllCompanies,
    /// Only stock held by the given company; other companies' allocations are
    /// ignored.
    CompanyOwned(CompanyId),
}

impl ValueObject for QuantityScope {}

impl QuantityScope {
    pub fn includes(&self, company_id: CompanyId) -> bool {
        match self {
            QuantityScope::AllCompanies => true,
            QuantityScope::CompanyOwned(own) => *own == company_id,
        }
    }
}
