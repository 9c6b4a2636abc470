//! Transaction-admission and account-ledger core of a blockchain execution node.
//! Inbound transactions pass the pre-validation gate before execution; admitted
//! value transfers are applied against an account ledger that preserves strict
//! conservation and non-negativity invariants across concurrent execution contexts.

pub mod types; // Addresses, accounts, deploy metadata, protocol constants and error enums.
pub mod config; // TOML-loaded configuration for bootstrap and protocol parameters.
pub mod context; // Pooled execution contexts scoping state access to one snapshot.
pub mod state; // Account store seam and its in-memory implementation.
pub mod ledger; // Balance engine: initialization, queries, atomic transfers.
pub mod registry; // Contract deployment metadata and activity state.
pub mod validation; // The pre-execution admission pipeline, one path per protocol version.

// Re-export the types callers wire together.
pub use config::Config;
pub use context::{ContextFactory, ContextType, ExecutionContext};
pub use ledger::LedgerEngine;
pub use registry::DeployRegistry;
pub use state::{AccountStore, MemoryStore};
pub use types::*;
pub use validation::{PreValidator, RequestV2, RequestV3, TransactionRequest, WireAmount};
