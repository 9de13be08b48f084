//! Product Catalog Core - entity, predicate, validation and mapping types.
//!
//! This crate holds everything about a product that does not touch I/O:
//! - the [`Product`] entity and its [`ProductId`] / [`ProductCategory`]
//! - [`ProductPredicate`], the backend-neutral query condition
//! - the wire DTOs exchanged with callers
//! - the validation and mapping pipelines applied to write requests
//!
//! # Architecture
//!
//! No I/O, no database access, no HTTP. Storage and orchestration live in
//! `product-catalog-api`, which depends on this crate.
//!
//! # Modules
//!
//! - [`types`] - Entity model and predicates
//! - [`dto`] - Request/response shapes
//! - [`validation`] - Write request rules
//! - [`mapping`] - Request/entity/response conversion

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dto;
pub mod mapping;
pub mod types;
pub mod validation;

pub use dto::{AddProductRequest, ProductResponse, UpdateProductRequest};
pub use mapping::{DefaultProductMapper, ProductMapper};
pub use types::*;
pub use validation::{
    DefaultProductValidator, FieldError, ProductDraft, ProductRevision, ProductValidator,
    ValidationErrors,
};
