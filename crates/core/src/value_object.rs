//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A service line
/// recorded in the journal is never edited; a corrected line is a new journal
/// entry.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`ServiceLine`, `CurrencyCode`, `InvoiceNumber`)
/// - **Entity**: has identity (`Client`, identified by its alias)
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct ServiceLine {
///     name: String,
///     units: u32,
///     rate: Decimal,
/// }
///
/// impl ValueObject for ServiceLine {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
