//! Core types for the product catalog.
//!
//! This module provides the entity model and the predicate abstraction used
//! to query it.

pub mod category;
pub mod id;
pub mod predicate;
pub mod product;

pub use category::{ParseCategoryError, ProductCategory};
pub use id::ProductId;
pub use predicate::{FieldValue, ProductPredicate, TextField};
pub use product::Product;
