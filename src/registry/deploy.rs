use crate::context::ExecutionContext;
use crate::types::{Address, DeployInfo};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Registry of contract deployment metadata
///
/// One record per address that is, or ever was, a deploy target; absence of a
/// record means no contract has ever been deployed to that address. Reads are
/// context-scoped with `None` meaning the latest committed state, which is
/// what address-collision checks use: a new deploy races against already
/// committed deployments, not against the validating context's snapshot.
pub struct DeployRegistry {
    scores: RwLock<HashMap<Address, DeployInfo>>,
}

impl DeployRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            scores: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the deployment record for `address`, if any
    pub async fn get_deploy_info(
        &self,
        _ctx: Option<&ExecutionContext>,
        address: &Address,
    ) -> Option<DeployInfo> {
        let scores = self.scores.read().await;
        scores.get(address).cloned()
    }

    /// True when `address` has a deployment record whose active flag is set.
    /// Never-deployed addresses are not active.
    pub async fn is_score_active(
        &self,
        _ctx: Option<&ExecutionContext>,
        address: &Address,
    ) -> bool {
        let scores = self.scores.read().await;
        scores.get(address).map(|info| info.active).unwrap_or(false)
    }

    /// Records or replaces the deployment metadata for a contract address
    pub async fn put_deploy_info(&self, _ctx: Option<&ExecutionContext>, info: DeployInfo) {
        debug!(score = %info.score_address, active = info.active, "deploy info recorded");
        let mut scores = self.scores.write().await;
        scores.insert(info.score_address.clone(), info);
    }
}

impl Default for DeployRegistry {
    fn default() -> Self {
        Self::new()
    }
}
