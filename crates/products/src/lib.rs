//! Product costing configuration.
//!
//! The company-dependent costing method (including "Last Purchase Price"), the
//! standard price it drives, and the rule that reprices a product when it
//! leaves FIFO costing.

pub mod cost_method;
pub mod product;
pub mod property;
pub mod settings;
pub mod transition;

pub use cost_method::{CostMethod, ValuationMode};
pub use product::{ProductCosting, ProductTemplate};
pub use property::CompanyProperty;
pub use settings::CostingSettings;
pub use transition::{
    ChangeCostMethod, CostMethodChanged, ProductEvent, StandardPriceUpdated,
    StockValuationSource, set_cost_method,
};
