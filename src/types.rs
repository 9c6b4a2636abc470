use ethers::types::{H256, U256};
use ethers::utils::keccak256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Maximum summed character length of a v3 transaction `data` payload.
pub const MAX_DATA_SIZE: usize = 512 * 1024;

/// The exact fee required by every legacy (v2) transfer, in loop units.
pub const FIXED_FEE: u128 = 10_000_000_000_000_000;

/// Deploy content type that skips new-address collision checking entirely.
/// Used by local development tooling where the contract is run in place.
pub const CONTENT_TYPE_TBEARS: &str = "application/tbears";

/// The production deploy content type. Installs with this content type go
/// through full new-address collision checking.
pub const CONTENT_TYPE_ZIP: &str = "application/zip";

/// `dataType` value marking a contract call transaction.
pub const DATA_TYPE_CALL: &str = "call";

/// `dataType` value marking a contract deploy transaction.
pub const DATA_TYPE_DEPLOY: &str = "deploy";

/// The install-deploy target convention: a deploy transaction addressed to
/// the zero contract address installs a new SCORE, anything else updates an
/// existing one.
pub const ZERO_SCORE_ADDRESS: Address = Address::Canonical {
    kind: AddressKind::Contract,
    body: [0u8; 20],
};

/// Discriminates the two canonical address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressKind {
    /// Externally owned account, text form `hx` + 40 hex chars
    Eoa,
    /// Smart contract (SCORE), text form `cx` + 40 hex chars
    Contract,
}

/// A ledger key.
///
/// Canonical addresses carry a 20-byte body and a contract/non-contract
/// discriminator. Anything that fails canonical parsing is kept verbatim as
/// an `Opaque` address: it is still a first-class ledger key (transfers to it
/// must succeed), but it is never a contract, so contract-only checks skip it
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Canonical { kind: AddressKind, body: [u8; 20] },
    Opaque(String),
}

impl Address {
    /// Canonical EOA address from a raw 20-byte body
    pub fn eoa(body: [u8; 20]) -> Self {
        Address::Canonical {
            kind: AddressKind::Eoa,
            body,
        }
    }

    /// Canonical contract address from a raw 20-byte body
    pub fn contract(body: [u8; 20]) -> Self {
        Address::Canonical {
            kind: AddressKind::Contract,
            body,
        }
    }

    /// Parse an address from its text form.
    ///
    /// Never fails: anything that is not `hx`/`cx` followed by 40 lowercase
    /// hex characters becomes an `Opaque` address holding the input verbatim.
    /// Canonical form is lowercase only, so every address renders back to
    /// exactly the text it was parsed from.
    pub fn from_string(s: &str) -> Self {
        match Self::parse_canonical(s) {
            Some((kind, body)) => Address::Canonical { kind, body },
            None => Address::Opaque(s.to_string()),
        }
    }

    fn parse_canonical(s: &str) -> Option<(AddressKind, [u8; 20])> {
        if s.len() != 42 || !s.is_ascii() {
            return None;
        }
        let kind = match &s[..2] {
            "hx" => AddressKind::Eoa,
            "cx" => AddressKind::Contract,
            _ => return None,
        };
        let hex = &s[2..];
        if !hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return None;
        }
        let mut body = [0u8; 20];
        for (i, byte) in body.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16).ok()?;
        }
        Some((kind, body))
    }

    /// True only for well-formed contract addresses (including the zero
    /// contract address); opaque addresses are never contracts
    pub fn is_contract(&self) -> bool {
        matches!(
            self,
            Address::Canonical {
                kind: AddressKind::Contract,
                ..
            }
        )
    }

    /// Byte representation used for hashing: a kind prefix byte plus the
    /// body for canonical addresses, the raw text bytes for opaque ones
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Address::Canonical { kind, body } => {
                let prefix = match kind {
                    AddressKind::Eoa => 0u8,
                    AddressKind::Contract => 1u8,
                };
                let mut bytes = Vec::with_capacity(21);
                bytes.push(prefix);
                bytes.extend_from_slice(body);
                bytes
            }
            Address::Opaque(raw) => raw.as_bytes().to_vec(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Canonical { kind, body } => {
                let prefix = match kind {
                    AddressKind::Eoa => "hx",
                    AddressKind::Contract => "cx",
                };
                write!(f, "{prefix}")?;
                for byte in body {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Address::Opaque(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Address::from_string(&s))
    }
}

/// Deterministically derive the contract address a deploy transaction would
/// install to, from the sender, the transaction timestamp and an optional
/// nonce. Pure function: the same inputs always yield the same address.
pub fn generate_score_address(from: &Address, timestamp: u64, nonce: Option<&U256>) -> Address {
    let mut data = from.to_bytes();
    data.extend_from_slice(&timestamp.to_be_bytes());
    if let Some(nonce) = nonce {
        let mut nonce_bytes = [0u8; 32];
        nonce.to_big_endian(&mut nonce_bytes);
        data.extend_from_slice(&nonce_bytes);
    }
    let hash = keccak256(data);
    let mut body = [0u8; 20];
    body.copy_from_slice(&hash[12..]);
    Address::contract(body)
}

/// How an account came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// The genesis account holding the initial total supply
    Genesis,
    /// The fee treasury account
    Treasury,
    /// Any account created implicitly by an incoming transfer
    General,
}

/// Account record stored in the account store.
///
/// Balance is a `U256`, so non-negativity holds by construction. An address
/// with no record reads as balance 0; the record is only materialized by
/// genesis bootstrap or by the first incoming transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub account_type: AccountType,
    /// Bootstrap name ("genesis", "treasury"); None for implicit accounts
    pub name: Option<String>,
    pub balance: U256,
}

impl Account {
    /// A fresh general account with zero balance, as materialized on first
    /// incoming transfer
    pub fn general(address: Address) -> Self {
        Self {
            address,
            account_type: AccountType::General,
            name: None,
            balance: U256::zero(),
        }
    }
}

/// Deployment metadata for a contract address. Presence of a record means a
/// deploy transaction has targeted this address at some point; absence means
/// no contract has ever been deployed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployInfo {
    pub score_address: Address,
    pub owner: Address,
    pub tx_hash: H256,
    pub content_type: String,
    pub active: bool,
}

/// Pre-validation rejections.
///
/// The three request-facing kinds are disjoint so callers can tell a
/// malformed request (`MissingField`) from a present-but-wrong field
/// (`InvalidParameter`) and from a business-rule violation on a well-formed
/// request (`InvalidRequest`). `Ledger` passes through wiring failures from
/// the ledger engine so internal faults are not disguised as request faults.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: '{0}'")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidParameter(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Ledger engine failures. These are last-resort assertions: economic
/// sufficiency is the pre-validator's job, so hitting `InsufficientBalance`
/// here means the caller skipped the admission gate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger engine is not open")]
    NotOpen,
    #[error("account already initialized: {address}")]
    AccountExists { address: Address },
    #[error("insufficient balance: {address} has {balance}, tried to move {amount}")]
    InsufficientBalance {
        address: Address,
        balance: U256,
        amount: U256,
    },
    #[error("balance overflow on {address}")]
    BalanceOverflow { address: Address },
    #[error("total supply overflow")]
    TotalSupplyOverflow,
}

/// Context pool failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("context pool exhausted: all {max_size} contexts are checked out")]
    PoolExhausted { max_size: usize },
    #[error("context pool is closed")]
    PoolClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_addresses() {
        let eoa = Address::from_string(&format!("hx{}", "a".repeat(40)));
        assert!(matches!(
            eoa,
            Address::Canonical {
                kind: AddressKind::Eoa,
                ..
            }
        ));
        assert!(!eoa.is_contract());

        let score = Address::from_string(&format!("cx{}", "b".repeat(40)));
        assert!(score.is_contract());

        let zero = Address::from_string(&format!("cx{}", "0".repeat(40)));
        assert_eq!(zero, ZERO_SCORE_ADDRESS);
    }

    #[test]
    fn malformed_inputs_become_opaque_addresses() {
        for raw in ["", "12341234", "hx1234512345", "cafe", "hxzz", "日本語"] {
            let address = Address::from_string(raw);
            assert!(matches!(address, Address::Opaque(_)), "{raw:?}");
            assert!(!address.is_contract());
            assert_eq!(address.to_string(), raw);
        }
    }

    #[test]
    fn canonical_display_round_trips() {
        let text = format!("hx{}", "0123456789".repeat(4));
        let address = Address::from_string(&text);
        assert_eq!(address.to_string(), text);
        assert_eq!(Address::from_string(&address.to_string()), address);
    }

    #[test]
    fn uppercase_hex_is_not_canonical() {
        // Canonical form is lowercase; mixed case stays opaque and renders
        // back verbatim instead of silently normalizing
        for raw in [
            format!("hx{}", "A".repeat(40)),
            format!("cx{}Ab", "1".repeat(38)),
        ] {
            let address = Address::from_string(&raw);
            assert!(matches!(address, Address::Opaque(_)), "{raw:?}");
            assert!(!address.is_contract());
            assert_eq!(address.to_string(), raw);
        }
    }

    #[test]
    fn score_address_derivation_is_deterministic() {
        let from = Address::from_string(&format!("hx{}", "a".repeat(40)));
        let nonce = U256::from(7u8);

        let first = generate_score_address(&from, 12345, Some(&nonce));
        let second = generate_score_address(&from, 12345, Some(&nonce));
        assert_eq!(first, second);
        assert!(first.is_contract());

        // Any input change moves the derived address
        assert_ne!(first, generate_score_address(&from, 12346, Some(&nonce)));
        assert_ne!(first, generate_score_address(&from, 12345, None));
        assert_ne!(
            first,
            generate_score_address(&from, 12345, Some(&U256::from(8u8)))
        );
    }
}
