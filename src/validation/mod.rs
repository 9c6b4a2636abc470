//! Transaction Validation Module
//!
//! This module is the pre-execution admission gate. An inbound request is
//! parsed once into a per-protocol typed form, then run through the
//! version-specific chain of structural and economic checks without causing
//! any state mutation.

mod request;
mod validator;


pub use request::{RequestV2, RequestV3, TransactionRequest, WireAmount};
pub use validator::PreValidator;
