use crate::types::ContextError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tracing::debug;

/// What a context is being checked out for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    /// Direct state access (bootstrap, tooling)
    Direct,
    /// Block execution: validation followed by ledger mutation
    Invoke,
    /// Read-only queries
    Query,
}

/// A checkout from the context pool, identifying one consistent point-in-time
/// view of chain state for the duration of a validation or mutation sequence.
///
/// The pool slot is held as an owned semaphore permit inside the context, so
/// the slot is released when the context is dropped on *any* path, including
/// early error returns partway through validation. `Option<&ExecutionContext>`
/// is the read-side parameter convention: `None` means "latest committed
/// state".
#[derive(Debug)]
pub struct ExecutionContext {
    id: u64,
    context_type: ContextType,
    _permit: OwnedSemaphorePermit,
}

impl ExecutionContext {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn context_type(&self) -> ContextType {
        self.context_type
    }
}

/// Bounded factory for execution contexts
///
/// At most `max_size` contexts may be outstanding at once. `create` waits for
/// a free slot; `try_create` rejects immediately with
/// [`ContextError::PoolExhausted`] when the pool is at capacity. Both are
/// defined behaviors; silent reuse of a busy slot never happens.
pub struct ContextFactory {
    max_size: usize,
    slots: Arc<Semaphore>,
    next_id: AtomicU64,
}

impl ContextFactory {
    /// Creates a factory with a pool of `max_size` context slots
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            slots: Arc::new(Semaphore::new(max_size)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Check out a context, waiting until a pool slot is free
    pub async fn create(&self, context_type: ContextType) -> Result<ExecutionContext, ContextError> {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ContextError::PoolClosed)?;
        Ok(self.issue(context_type, permit))
    }

    /// Check out a context, rejecting immediately when the pool is exhausted
    pub fn try_create(&self, context_type: ContextType) -> Result<ExecutionContext, ContextError> {
        let permit = self
            .slots
            .clone()
            .try_acquire_owned()
            .map_err(|e| match e {
                TryAcquireError::NoPermits => ContextError::PoolExhausted {
                    max_size: self.max_size,
                },
                TryAcquireError::Closed => ContextError::PoolClosed,
            })?;
        Ok(self.issue(context_type, permit))
    }

    /// Return a context to the pool
    ///
    /// Dropping the context has the same effect; this method exists so call
    /// sites can make the release explicit.
    pub fn destroy(&self, context: ExecutionContext) {
        debug!(id = context.id(), "context released");
        drop(context);
    }

    /// Pool capacity
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    fn issue(&self, context_type: ContextType, permit: OwnedSemaphorePermit) -> ExecutionContext {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, ?context_type, "context checked out");
        ExecutionContext {
            id,
            context_type,
            _permit: permit,
        }
    }
}
