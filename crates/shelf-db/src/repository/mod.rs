//! # Repositories
//!
//! One repository per table, each holding a clone of the pool.

pub mod product;
