//! Company-dependent properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stockcost_core::CompanyId;

/// A value that each company may override.
///
/// Reads fall back to the default when the company has no value of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProperty<T> {
    default: T,
    per_company: BTreeMap<CompanyId, T>,
}

impl<T: Clone> CompanyProperty<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            per_company: BTreeMap::new(),
        }
    }

    pub fn get(&self, company_id: CompanyId) -> &T {
        self.per_company.get(&company_id).unwrap_or(&self.default)
    }

    pub fn set(&mut self, company_id: CompanyId, value: T) {
        self.per_company.insert(company_id, value);
    }

    /// Whether the company carries its own value.
    pub fn is_overridden(&self, company_id: CompanyId) -> bool {
        self.per_company.contains_key(&company_id)
    }
}
