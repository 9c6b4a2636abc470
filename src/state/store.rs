use crate::context::ExecutionContext;
use crate::types::{Account, Address};
use async_trait::async_trait;
use ethers::types::U256;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Storage collaborator contract for the ledger engine.
///
/// All operations are scoped to a context's snapshot; `None` means the latest
/// committed state. Snapshot isolation across contexts is the backend's
/// concern, not the engine's, so the in-memory implementation below treats
/// every context as a view of the same latest state.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Returns the stored account record, or `None` if the address has never
    /// been materialized
    async fn get_account(&self, ctx: Option<&ExecutionContext>, address: &Address)
    -> Option<Account>;

    /// Stores an account record, replacing any previous one for the address
    async fn put_account(&self, ctx: Option<&ExecutionContext>, account: Account);

    /// Returns the tracked total supply (0 before genesis bootstrap)
    async fn get_total_supply(&self, ctx: Option<&ExecutionContext>) -> U256;

    /// Stores the total supply scalar
    async fn put_total_supply(&self, ctx: Option<&ExecutionContext>, total_supply: U256);
}

/// In-memory account store
///
/// Accounts keyed by address behind a read-write lock, with the total-supply
/// scalar alongside. Malformed (opaque) addresses hash like any other key.
pub struct MemoryStore {
    accounts: RwLock<HashMap<Address, Account>>,
    total_supply: RwLock<U256>,
}

impl MemoryStore {
    /// Creates an empty store with total supply 0
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            total_supply: RwLock::new(U256::zero()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_account(
        &self,
        _ctx: Option<&ExecutionContext>,
        address: &Address,
    ) -> Option<Account> {
        let accounts = self.accounts.read().await;
        accounts.get(address).cloned()
    }

    async fn put_account(&self, _ctx: Option<&ExecutionContext>, account: Account) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.address.clone(), account);
    }

    async fn get_total_supply(&self, _ctx: Option<&ExecutionContext>) -> U256 {
        *self.total_supply.read().await
    }

    async fn put_total_supply(&self, _ctx: Option<&ExecutionContext>, total_supply: U256) {
        *self.total_supply.write().await = total_supply;
    }
}
