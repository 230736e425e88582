//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity and are compared by their attributes, e.g.
/// the company scope of a call, a receipt search domain, or the forced amounts
/// handed to the accounting-entry generator.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct AccountEntryOverrides {
///     force_valuation_amount: Decimal,
///     forced_quantity: Decimal,
/// }
///
/// impl ValueObject for AccountEntryOverrides {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
