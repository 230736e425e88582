//! Costing policies and inventory valuation modes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use stockcost_core::DomainError;

/// How a product's stock is valued.
///
/// The string codes (`standard`, `last`, `fifo`, `average`) are stable and are
/// what hosts store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMethod {
    /// Valued at the standard cost defined on the product.
    #[default]
    Standard,
    /// Valued like `Standard`, with the standard price replaced by the latest
    /// purchase price on every receipt.
    Last,
    /// First in, first out: receipts are consumed in arrival order.
    Fifo,
    /// Weighted average cost (AVCO).
    Average,
}

impl CostMethod {
    pub const ALL: [CostMethod; 4] = [
        CostMethod::Standard,
        CostMethod::Last,
        CostMethod::Fifo,
        CostMethod::Average,
    ];

    pub fn code(self) -> &'static str {
        match self {
            CostMethod::Standard => "standard",
            CostMethod::Last => "last",
            CostMethod::Fifo => "fifo",
            CostMethod::Average => "average",
        }
    }

    /// Label shown to operators.
    pub fn label(self) -> &'static str {
        match self {
            CostMethod::Standard => "Standard Price",
            CostMethod::Last => "Last Purchase Price",
            CostMethod::Fifo => "First In First Out (FIFO)",
            CostMethod::Average => "Average Cost (AVCO)",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            CostMethod::Standard => {
                "The products are valued at their standard cost defined on the product."
            }
            CostMethod::Last => {
                "The products are valued the same way as 'Standard Price', but the standard \
                 price defined on the product is updated automatically with the last purchase \
                 price."
            }
            CostMethod::Fifo => {
                "The products are valued supposing those that enter the company first will \
                 also leave it first."
            }
            CostMethod::Average => "The products are valued at weighted average cost.",
        }
    }

    /// Whether moves are valued from the product's standard price rather than
    /// from receipt layers.
    pub fn prices_from_standard(self) -> bool {
        !matches!(self, CostMethod::Fifo)
    }
}

impl FromStr for CostMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "last" => Ok(Self::Last),
            "fifo" => Ok(Self::Fifo),
            "average" => Ok(Self::Average),
            other => Err(DomainError::validation(format!("unknown cost method: {other}"))),
        }
    }
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether inventory value changes post accounting entries immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMode {
    #[default]
    ManualPeriodic,
    RealTime,
}

impl ValuationMode {
    pub fn is_real_time(self) -> bool {
        matches!(self, ValuationMode::RealTime)
    }
}

impl FromStr for ValuationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual_periodic" | "manual" => Ok(Self::ManualPeriodic),
            "real_time" => Ok(Self::RealTime),
            other => Err(DomainError::validation(format!("unknown valuation mode: {other}"))),
        }
    }
}

impl fmt::Display for ValuationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationMode::ManualPeriodic => f.write_str("manual_periodic"),
            ValuationMode::RealTime => f.write_str("real_time"),
        }
    }
}
