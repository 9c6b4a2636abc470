//! Deploy Registry Module
//!
//! This module tracks deployment metadata per contract address: who deployed
//! it, with what content type, and whether it is currently active. The
//! pre-validator reads it for contract-activity and address-collision checks.

mod deploy;

pub use deploy::DeployRegistry;
