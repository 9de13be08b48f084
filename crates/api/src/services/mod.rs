//! Business operations on top of storage.

pub mod products;

pub use products::{ProductService, ProductServiceError};
