//! Ledger Engine Module
//!
//! This module owns account balance semantics: genesis/treasury
//! initialization, balance queries, atomic transfers and total-supply
//! tracking. It is deliberately a minimal mutation primitive; economic
//! sufficiency is checked by the pre-validator before `transfer` is called.

mod engine;


pub use engine::LedgerEngine;
