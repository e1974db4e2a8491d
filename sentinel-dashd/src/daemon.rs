use async_trait::async_trait;
use serde_json::{json, Value};

use sentinel_utils::amount::amount_from_json;
use sentinel_utils::Network;

use crate::election::elect_mn;
use crate::error::DaemonError;
use crate::TARGET_BLOCK_SPACING;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasternodeEntry {
    pub outpoint: String,
    pub status: String,
}

impl MasternodeEntry {
    pub fn is_enabled(&self) -> bool {
        self.status == "ENABLED"
    }
}

#[async_trait]
pub trait Daemon: Send + Sync {
    fn network(&self) -> Network;

    /// Raw RPC invocation. Fails with [`DaemonError::Connectivity`] when the
    /// daemon cannot be reached.
    async fn rpc_command(&self, method: &str, params: &[Value]) -> Result<Value, DaemonError>;

    /// Succeeds when dashd answers at all, even with an RPC error.
    async fn check_connectivity(&self) -> Result<(), DaemonError> {
        match self.rpc_command("getblockcount", &[]).await {
            Ok(_) => Ok(()),
            Err(DaemonError::Rpc { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn block_count(&self) -> Result<u64, DaemonError> {
        let result = self.rpc_command("getblockcount", &[]).await?;
        result
            .as_u64()
            .ok_or_else(|| DaemonError::invalid_response("getblockcount", result.to_string()))
    }

    async fn block_hash(&self, height: u64) -> Result<String, DaemonError> {
        let result = self.rpc_command("getblockhash", &[json!(height)]).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DaemonError::invalid_response("getblockhash", result.to_string()))
    }

    async fn governance_info(&self) -> Result<Value, DaemonError> {
        self.rpc_command("getgovernanceinfo", &[]).await
    }

    async fn superblock_cycle(&self) -> Result<u64, DaemonError> {
        let info = self.governance_info().await?;
        Ok(info
            .get("superblockcycle")
            .and_then(Value::as_u64)
            .filter(|cycle| *cycle > 0)
            .unwrap_or_else(|| self.network().superblock_cycle()))
    }

    async fn last_superblock_height(&self) -> Result<u64, DaemonError> {
        let height = self.block_count().await?;
        let cycle = self.superblock_cycle().await?;
        Ok(cycle * (height / cycle))
    }

    async fn next_superblock_height(&self) -> Result<u64, DaemonError> {
        let cycle = self.superblock_cycle().await?;
        Ok(self.last_superblock_height().await? + cycle)
    }

    /// True once the chain is within the maturity window ahead of `height`.
    async fn is_govobj_maturity_phase(&self, height: u64) -> Result<bool, DaemonError> {
        let maturity_phase_start = height.saturating_sub(self.network().maturity_phase_delta());
        Ok(self.block_count().await? >= maturity_phase_start)
    }

    /// This node's collateral outpoint, or `None` if dashd is not running as
    /// a masternode.
    async fn current_masternode_outpoint(&self) -> Result<Option<String>, DaemonError> {
        match self.rpc_command("masternode", &[json!("status")]).await {
            Ok(status) => Ok(status
                .get("outpoint")
                .or_else(|| status.get("vin"))
                .and_then(Value::as_str)
                .map(str::to_string)),
            Err(DaemonError::Rpc { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn is_masternode(&self) -> Result<bool, DaemonError> {
        Ok(self.current_masternode_outpoint().await?.is_some())
    }

    async fn is_synced(&self) -> Result<bool, DaemonError> {
        let status = self.rpc_command("mnsync", &[json!("status")]).await?;
        Ok(status.get("IsSynced").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn masternodes(&self) -> Result<Vec<MasternodeEntry>, DaemonError> {
        let list = self.rpc_command("masternodelist", &[json!("json")]).await?;
        let entries = list
            .as_object()
            .ok_or_else(|| DaemonError::invalid_response("masternodelist", "expected an object"))?;
        Ok(entries
            .iter()
            .map(|(outpoint, info)| MasternodeEntry {
                outpoint: outpoint.clone(),
                status: info
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }

    /// Whether this masternode is elected to submit the next superblock.
    async fn we_are_the_winner(&self) -> Result<bool, DaemonError> {
        let Some(my_outpoint) = self.current_masternode_outpoint().await? else {
            return Ok(false);
        };
        let height = self.block_count().await?;
        let block_hash = self.block_hash(height).await?;
        let masternodes = self.masternodes().await?;
        Ok(elect_mn(&block_hash, &masternodes).as_deref() == Some(my_outpoint.as_str()))
    }

    /// Minimum absolute yes count for a proposal to be funded.
    async fn governance_quorum(&self) -> Result<i64, DaemonError> {
        let min_quorum = self
            .governance_info()
            .await?
            .get("governanceminquorum")
            .and_then(Value::as_i64)
            .unwrap_or(1);
        let count = self.rpc_command("masternode", &[json!("count")]).await?;
        let enabled = count
            .as_i64()
            .or_else(|| count.get("enabled").and_then(Value::as_i64))
            .ok_or_else(|| DaemonError::invalid_response("masternode count", count.to_string()))?;
        Ok(min_quorum.max(enabled / 10))
    }

    /// Budget available at `height`, in duffs.
    async fn superblock_budget(&self, height: u64) -> Result<u64, DaemonError> {
        let result = self.rpc_command("getsuperblockbudget", &[json!(height)]).await?;
        amount_from_json(&result)
            .map_err(|e| DaemonError::invalid_response("getsuperblockbudget", e.to_string()))
    }

    /// Estimated unix time at which `height` will be mined.
    async fn block_height_to_epoch(&self, height: u64) -> Result<i64, DaemonError> {
        let current = self.block_count().await? as i64;
        let now = chrono::Utc::now().timestamp();
        Ok(now + (height as i64 - current) * TARGET_BLOCK_SPACING)
    }

    async fn gobject_list(&self) -> Result<Value, DaemonError> {
        self.rpc_command("gobject", &[json!("list")]).await
    }
}
