//! Contract gateway: JSON-RPC access to the deployed token and
//! reward-distribution contracts.
//!
//! Configuration defects (missing or malformed signing key, malformed
//! contract address) are detected eagerly per call and reported as
//! [`GatewayError::Config`] before any network traffic. Transport and
//! contract-call failures propagate as [`GatewayError::Upstream`] with no
//! retry.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Deserialize;
use thiserror::Error;

use crate::config::ChainConfig;
use crate::units;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("contract gateway misconfigured: {0}")]
    Config(String),

    #[error("chain call failed: {0}")]
    Upstream(String),
}

/// Receipt for a mined distribution transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributeOutcome {
    pub tx_hash: String,
}

/// The five logical contract operations the API composes.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Token balance of `address`, in smallest units.
    async fn token_balance(&self, address: &str) -> Result<u128, GatewayError>;

    /// Configured reward for `action`, in smallest units. Zero means no
    /// reward is configured.
    async fn action_reward(&self, action: &str) -> Result<u128, GatewayError>;

    /// Whether `address` has already claimed `action`.
    async fn has_claimed(&self, address: &str, action: &str) -> Result<bool, GatewayError>;

    /// Distribute the configured reward for `action` to `address`. Blocks
    /// until the submitted transaction is mined.
    async fn distribute(&self, address: &str, action: &str)
    -> Result<DistributeOutcome, GatewayError>;

    /// Lifetime rewards granted to `address`, maintained by the contract.
    async fn user_total_rewards(&self, address: &str) -> Result<u128, GatewayError>;

    /// Address of the reward-distribution contract, the `from` side of
    /// every distribution transfer.
    fn reward_contract(&self) -> &str;
}

#[derive(Clone)]
pub struct ChainRpcClient {
    inner: HttpClient,
    chain: ChainConfig,
    timeout: Duration,
}

impl ChainRpcClient {
    pub fn new(chain: ChainConfig) -> anyhow::Result<Self> {
        assert!(!chain.rpc_url.is_empty(), "RPC endpoint must be provided");
        let timeout = chain.request_timeout();
        assert!(
            timeout >= Duration::from_millis(100),
            "Timeout below 100ms is unsafe"
        );

        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(&chain.rpc_url)
            .map_err(|err| {
                anyhow::anyhow!("Failed to build RPC client for {}: {err}", chain.rpc_url)
            })?;

        Ok(Self {
            inner: client,
            chain,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        assert!(
            self.timeout >= Duration::from_millis(100),
            "Timeout invariant broken"
        );
        assert!(
            self.timeout <= Duration::from_secs(60),
            "Timeout exceeds maximum bound"
        );
        self.timeout
    }

    fn ensure_contract(kind: &str, address: &str) -> Result<(), GatewayError> {
        if address.is_empty() {
            return Err(GatewayError::Config(format!(
                "{kind} contract address is not configured"
            )));
        }
        let well_formed = address
            .strip_prefix("0x")
            .is_some_and(|body| body.len() == 40 && hex::decode(body).is_ok());
        if !well_formed {
            return Err(GatewayError::Config(format!(
                "{kind} contract address is malformed"
            )));
        }
        Ok(())
    }

    fn ensure_signer(&self) -> Result<(), GatewayError> {
        let key = &self.chain.signer_key;
        if key.is_empty() {
            return Err(GatewayError::Config(
                "signing key is not configured".to_string(),
            ));
        }
        let well_formed = key
            .strip_prefix("0x")
            .is_some_and(|body| body.len() == 64 && hex::decode(body).is_ok());
        if !well_formed {
            return Err(GatewayError::Config("signing key is malformed".to_string()));
        }
        Ok(())
    }

    async fn call<R>(&self, method: &'static str, params: ObjectParams) -> Result<R, GatewayError>
    where
        R: for<'de> Deserialize<'de>,
    {
        self.inner
            .request(method, params)
            .await
            .map_err(|err| GatewayError::Upstream(format!("RPC call {method} failed: {err}")))
    }

    fn parse_amount(method: &str, raw: &str) -> Result<u128, GatewayError> {
        units::parse_base_units(raw)
            .map_err(|err| GatewayError::Upstream(format!("RPC call {method}: {err}")))
    }
}

fn encode_err(name: &str, err: serde_json::Error) -> GatewayError {
    GatewayError::Upstream(format!("Failed to encode {name} parameter: {err}"))
}

#[async_trait]
impl ContractGateway for ChainRpcClient {
    async fn token_balance(&self, address: &str) -> Result<u128, GatewayError> {
        Self::ensure_contract("token", &self.chain.token_address)?;

        let mut params = ObjectParams::new();
        params
            .insert("contract", &self.chain.token_address)
            .map_err(|err| encode_err("contract", err))?;
        params
            .insert("address", address)
            .map_err(|err| encode_err("address", err))?;

        let response: BalanceResponse = self.call("token_balanceOf", params).await?;
        Self::parse_amount("token_balanceOf", &response.balance)
    }

    async fn action_reward(&self, action: &str) -> Result<u128, GatewayError> {
        Self::ensure_contract("reward", &self.chain.reward_address)?;

        let mut params = ObjectParams::new();
        params
            .insert("contract", &self.chain.reward_address)
            .map_err(|err| encode_err("contract", err))?;
        params
            .insert("action", action)
            .map_err(|err| encode_err("action", err))?;

        let response: ActionRewardResponse = self.call("rewards_actionReward", params).await?;
        Self::parse_amount("rewards_actionReward", &response.amount)
    }

    async fn has_claimed(&self, address: &str, action: &str) -> Result<bool, GatewayError> {
        Self::ensure_contract("reward", &self.chain.reward_address)?;

        let mut params = ObjectParams::new();
        params
            .insert("contract", &self.chain.reward_address)
            .map_err(|err| encode_err("contract", err))?;
        params
            .insert("address", address)
            .map_err(|err| encode_err("address", err))?;
        params
            .insert("action", action)
            .map_err(|err| encode_err("action", err))?;

        let response: HasClaimedResponse = self.call("rewards_hasClaimed", params).await?;
        Ok(response.claimed)
    }

    async fn distribute(
        &self,
        address: &str,
        action: &str,
    ) -> Result<DistributeOutcome, GatewayError> {
        Self::ensure_contract("reward", &self.chain.reward_address)?;
        self.ensure_signer()?;

        let mut params = ObjectParams::new();
        params
            .insert("contract", &self.chain.reward_address)
            .map_err(|err| encode_err("contract", err))?;
        params
            .insert("signer", &self.chain.signer_key)
            .map_err(|err| encode_err("signer", err))?;
        params
            .insert("recipient", address)
            .map_err(|err| encode_err("recipient", err))?;
        params
            .insert("action", action)
            .map_err(|err| encode_err("action", err))?;

        let response: DistributeResponse = self.call("rewards_distribute", params).await?;
        assert!(
            !response.tx_hash.is_empty(),
            "RPC returned empty transaction hash"
        );
        Ok(DistributeOutcome {
            tx_hash: response.tx_hash,
        })
    }

    async fn user_total_rewards(&self, address: &str) -> Result<u128, GatewayError> {
        Self::ensure_contract("reward", &self.chain.reward_address)?;

        let mut params = ObjectParams::new();
        params
            .insert("contract", &self.chain.reward_address)
            .map_err(|err| encode_err("contract", err))?;
        params
            .insert("address", address)
            .map_err(|err| encode_err("address", err))?;

        let response: UserTotalResponse = self.call("rewards_userTotal", params).await?;
        Self::parse_amount("rewards_userTotal", &response.total)
    }

    fn reward_contract(&self) -> &str {
        &self.chain.reward_address
    }
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
}

#[derive(Debug, Deserialize)]
struct ActionRewardResponse {
    amount: String,
}

#[derive(Debug, Deserialize)]
struct HasClaimedResponse {
    claimed: bool,
}

#[derive(Debug, Deserialize)]
struct DistributeResponse {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct UserTotalResponse {
    total: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const REWARD: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn chain_config(signer_key: &str, reward_address: &str) -> ChainConfig {
        ChainConfig {
            rpc_url: "http://localhost:8545".to_string(),
            request_timeout_ms: None,
            signer_key: signer_key.to_string(),
            token_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            reward_address: reward_address.to_string(),
        }
    }

    #[test]
    fn test_ensure_signer() {
        let ok = ChainRpcClient::new(chain_config(KEY, REWARD)).unwrap();
        assert!(ok.ensure_signer().is_ok());

        let missing = ChainRpcClient::new(chain_config("", REWARD)).unwrap();
        assert!(matches!(
            missing.ensure_signer(),
            Err(GatewayError::Config(_))
        ));

        let unprefixed = ChainRpcClient::new(chain_config(&KEY[2..], REWARD)).unwrap();
        assert!(matches!(
            unprefixed.ensure_signer(),
            Err(GatewayError::Config(_))
        ));

        let short = ChainRpcClient::new(chain_config("0xac0974", REWARD)).unwrap();
        assert!(matches!(short.ensure_signer(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_ensure_contract() {
        assert!(ChainRpcClient::ensure_contract("reward", REWARD).is_ok());
        assert!(matches!(
            ChainRpcClient::ensure_contract("reward", ""),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            ChainRpcClient::ensure_contract("reward", "not-an-address"),
            Err(GatewayError::Config(_))
        ));
        assert!(matches!(
            ChainRpcClient::ensure_contract("reward", "0x1234"),
            Err(GatewayError::Config(_))
        ));
    }
}
