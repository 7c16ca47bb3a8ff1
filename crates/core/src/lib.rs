//! `ledgerbook-core` — shared domain building blocks.
//!
//! Identifiers, the domain error model and the small marker traits used by the
//! accounting engine and the report host. No infrastructure concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BookId, TenantId};
pub use value_object::ValueObject;
