//! # Repository Layer
//!
//! One repository per aggregate, each wrapping the shared pool:
//!
//! - [`material`] - the priceable catalog the wire encoding references
//! - [`invoice`] - invoice/draft headers and their owned line-items
//! - [`reference`] - existence checks for customers, vehicles, job types
//!
//! Reads go through the pool directly. Writes that must be atomic with other
//! writes take a `&mut SqliteConnection`, so the reconciler can thread one
//! transaction through every mutation of a single call.

pub mod invoice;
pub mod material;
pub mod reference;
