//! `stockcost-core`: shared building blocks for stock costing.
//!
//! Identifiers, the domain error model and the explicit company scope that is
//! threaded through every costing call. No infrastructure concerns live here.

pub mod context;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use context::{CompanyContext, QuantityScope};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, LocationId, MoveLineId, ProductId, ProductTemplateId, StockMoveId};
pub use value_object::ValueObject;
