//! `invoicer-core` — building blocks shared by every invoicer crate.
//!
//! This crate contains **pure** primitives (no IO, no clock, no network).

pub mod currency;
pub mod entity;
pub mod error;
pub mod money;
pub mod value_object;

pub use currency::{CurrencyCode, DEFAULT_BASE_CURRENCY};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use money::format_amount;
pub use value_object::ValueObject;
