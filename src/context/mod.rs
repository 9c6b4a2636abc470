//! Execution Context Module
//!
//! This module provides bounded-lifetime handles over a consistent snapshot
//! of ledger and registry state. Contexts are issued from a pooled factory
//! with a fixed capacity; the pool is the sole admission-control point for
//! concurrent state access.

mod factory;

#[cfg(test)]
mod tests;

pub use factory::{ContextFactory, ContextType, ExecutionContext};
