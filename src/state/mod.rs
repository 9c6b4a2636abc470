//! Account Store Module
//!
//! This module defines the storage seam the ledger engine writes through:
//! the `AccountStore` trait mirrors the persistent key-value collaborator
//! (get/put over account keys plus the total-supply scalar), and
//! `MemoryStore` is the in-memory implementation used for tests and
//! single-process deployments.

mod store;

pub use store::{AccountStore, MemoryStore};
