//! Inventory valuation corrections.
//!
//! When the done quantity of a completed, stock-affecting move line is edited,
//! the parent move's value (and for FIFO its receipt layer) is corrected
//! through a costing-method specific [`RevaluationPolicy`], accounting and
//! price propagation are notified, and only then is the edit written.

pub mod backend;
pub mod in_memory;
pub mod location;
pub mod move_line;
pub mod policy;
pub mod revaluation;
pub mod stock_move;

pub use backend::{
    AccountEntryOverrides, AccountingHooks, FifoConsumer, MoveLineStore, MoveStore,
    ProductCatalog, StockBackend,
};
pub use in_memory::{InMemoryStock, RecordedAccountEntry, RecordedPriceUpdate};
pub use location::{Location, LocationUsage};
pub use move_line::{MoveLine, MoveLineWrite};
pub use policy::{
    FifoPolicy, RestoredLayer, Revaluation, RevaluationPolicy, StandardPricePolicy, policy_for,
};
pub use revaluation::{
    EditMoveLines, MoveRevalued, ReceiptLayerRestored, RevaluationOutcome, ValuationEvent,
    write_move_lines,
};
pub use stock_move::{MoveDirection, MoveState, MoveValuationUpdate, ReceiptDomain, StockMove};
