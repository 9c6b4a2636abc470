use crate::context::ExecutionContext;
use crate::state::AccountStore;
use crate::types::{Account, AccountType, Address, LedgerError};
use ethers::types::U256;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Account balance engine.
///
/// Binds to an [`AccountStore`] via `open`/`close` and performs all balance
/// mutations through it. Two invariants hold across every operation:
///
/// - no account balance ever goes negative (`U256` plus checked subtraction);
/// - total supply equals the sum of all balances: `init_account` adds its
///   amount to the tracked supply, `transfer` moves value without creating
///   or destroying any.
///
/// Address well-formedness is irrelevant here; opaque (malformed) addresses
/// are ordinary ledger keys.
pub struct LedgerEngine {
    store: RwLock<Option<Arc<dyn AccountStore>>>,
}

impl LedgerEngine {
    /// Creates an engine with no storage bound; call `open` before use
    pub fn new() -> Self {
        Self {
            store: RwLock::new(None),
        }
    }

    /// Binds the engine to an account store. Rebinding replaces the previous
    /// store without touching its contents.
    pub async fn open(&self, store: Arc<dyn AccountStore>) {
        let mut slot = self.store.write().await;
        *slot = Some(store);
        info!("ledger engine opened");
    }

    /// Releases the storage binding; every operation afterwards returns
    /// [`LedgerError::NotOpen`] until a new `open`
    pub async fn close(&self) {
        let mut slot = self.store.write().await;
        *slot = None;
        info!("ledger engine closed");
    }

    async fn store(&self) -> Result<Arc<dyn AccountStore>, LedgerError> {
        let slot = self.store.read().await;
        slot.clone().ok_or(LedgerError::NotOpen)
    }

    /// Materializes an account with a starting balance and adds that balance
    /// to the total supply. Used only at genesis/treasury bootstrap.
    ///
    /// Calling this for an already-materialized address is refused with
    /// [`LedgerError::AccountExists`]: silently overwriting would break the
    /// supply invariant.
    pub async fn init_account(
        &self,
        ctx: Option<&ExecutionContext>,
        account_type: AccountType,
        name: &str,
        address: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let store = self.store().await?;

        if store.get_account(ctx, address).await.is_some() {
            warn!(%address, "refusing to re-initialize materialized account");
            return Err(LedgerError::AccountExists {
                address: address.clone(),
            });
        }

        let supply = store
            .get_total_supply(ctx)
            .await
            .checked_add(amount)
            .ok_or(LedgerError::TotalSupplyOverflow)?;

        store
            .put_account(
                ctx,
                Account {
                    address: address.clone(),
                    account_type,
                    name: Some(name.to_string()),
                    balance: amount,
                },
            )
            .await;
        store.put_total_supply(ctx, supply).await;

        info!(%address, name, %amount, "account initialized");
        Ok(())
    }

    /// Returns the balance of `address`, 0 for any address with no record
    /// (never-used and malformed addresses included)
    pub async fn get_balance(
        &self,
        ctx: Option<&ExecutionContext>,
        address: &Address,
    ) -> Result<U256, LedgerError> {
        let store = self.store().await?;
        let balance = store
            .get_account(ctx, address)
            .await
            .map(|account| account.balance)
            .unwrap_or_default();
        Ok(balance)
    }

    /// Returns the tracked total supply
    pub async fn get_total_supply(
        &self,
        ctx: Option<&ExecutionContext>,
    ) -> Result<U256, LedgerError> {
        let store = self.store().await?;
        Ok(store.get_total_supply(ctx).await)
    }

    /// Moves exactly `amount` from `from` to `to`, materializing `to` if it
    /// has no record yet.
    ///
    /// All-or-nothing within the context: both resulting balances are
    /// computed and checked before either side is written. The resulting
    /// `from` balance must be non-negative; affordability including fees is
    /// the pre-validator's responsibility and is only re-asserted here.
    pub async fn transfer(
        &self,
        ctx: Option<&ExecutionContext>,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let store = self.store().await?;

        let mut from_account = store
            .get_account(ctx, from)
            .await
            .unwrap_or_else(|| Account::general(from.clone()));

        let from_balance = from_account.balance.checked_sub(amount).ok_or_else(|| {
            warn!(%from, balance = %from_account.balance, %amount, "transfer rejected: insufficient balance");
            LedgerError::InsufficientBalance {
                address: from.clone(),
                balance: from_account.balance,
                amount,
            }
        })?;

        // A self-transfer that passed the balance assertion changes nothing;
        // writing both sides from stale copies would mint value.
        if from == to {
            return Ok(());
        }

        let mut to_account = store
            .get_account(ctx, to)
            .await
            .unwrap_or_else(|| Account::general(to.clone()));

        let to_balance =
            to_account
                .balance
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow {
                    address: to.clone(),
                })?;

        from_account.balance = from_balance;
        to_account.balance = to_balance;
        store.put_account(ctx, from_account).await;
        store.put_account(ctx, to_account).await;

        debug!(%from, %to, %amount, "transfer applied");
        Ok(())
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}
