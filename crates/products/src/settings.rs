//! Defaults applied to newly created product templates.

use anyhow::{Context, Result};

use crate::cost_method::{CostMethod, ValuationMode};

pub const DEFAULT_COST_METHOD_VAR: &str = "STOCKCOST_DEFAULT_COST_METHOD";
pub const DEFAULT_VALUATION_VAR: &str = "STOCKCOST_DEFAULT_VALUATION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostingSettings {
    pub default_cost_method: CostMethod,
    pub default_valuation: ValuationMode,
}

impl CostingSettings {
    /// Read defaults from the process environment.
    ///
    /// Unset variables keep the built-in defaults (`standard`,
    /// `manual_periodic`); set but unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(DEFAULT_COST_METHOD_VAR) {
            settings.default_cost_method = raw
                .parse::<CostMethod>()
                .with_context(|| format!("{DEFAULT_COST_METHOD_VAR} is invalid"))?;
        }
        if let Some(raw) = lookup(DEFAULT_VALUATION_VAR) {
            settings.default_valuation = raw
                .parse::<ValuationMode>()
                .with_context(|| format!("{DEFAULT_VALUATION_VAR} is invalid"))?;
        }

        tracing::debug!(
            cost_method = %settings.default_cost_method,
            valuation = %settings.default_valuation,
            "costing settings loaded"
        );
        Ok(settings)
    }
}
