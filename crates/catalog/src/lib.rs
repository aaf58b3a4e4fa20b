//! `stockmaster-catalog` — product and warehouse reference data.
//!
//! The inventory core resolves products and warehouses by id only; this
//! crate owns the entities behind those ids.

pub mod product;
pub mod warehouse;

pub use product::{Product, ProductPatch};
pub use warehouse::Warehouse;
