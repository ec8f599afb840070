//! Shared harness for the HTTP integration tests: the full router over the
//! in-memory store and a scriptable contract gateway double.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use rewards_api::http;
use rewards_api::rpc::{ContractGateway, DistributeOutcome, GatewayError};
use rewards_api::state::AppState;
use rewards_api::storage::{MemoryStore, RewardStore};

pub const REWARD_CONTRACT: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";

pub const TOKENS: u128 = 1_000_000_000_000_000_000;

/// Contract gateway double. Rewards, balances and claim state are held in
/// maps; `distribute` marks the pair claimed and mints a deterministic
/// transaction hash.
pub struct MockGateway {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    balances: HashMap<String, u128>,
    rewards: HashMap<String, u128>,
    totals: HashMap<String, u128>,
    claimed: HashSet<(String, String)>,
    next_tx: u64,
    config_error: Option<String>,
}

impl MockGateway {
    /// Gateway preconfigured with the catalogue's deployed reward amounts.
    pub fn with_default_rewards() -> Self {
        let gateway = Self {
            inner: Mutex::new(MockInner::default()),
        };
        gateway.set_reward("signup", 100 * TOKENS);
        gateway.set_reward("login", 10 * TOKENS);
        gateway.set_reward("referral", 50 * TOKENS);
        gateway.set_reward("task_complete", 25 * TOKENS);
        gateway
    }

    pub fn set_balance(&self, address: &str, amount: u128) {
        self.lock().balances.insert(address.to_lowercase(), amount);
    }

    pub fn set_reward(&self, action: &str, amount: u128) {
        self.lock().rewards.insert(action.to_string(), amount);
    }

    pub fn set_total(&self, address: &str, amount: u128) {
        self.lock().totals.insert(address.to_lowercase(), amount);
    }

    pub fn set_claimed(&self, address: &str, action: &str) {
        self.lock()
            .claimed
            .insert((address.to_lowercase(), action.to_string()));
    }

    /// Make every subsequent call fail as a configuration defect.
    pub fn set_config_error(&self, message: &str) {
        self.lock().config_error = Some(message.to_string());
    }

    pub fn distribute_count(&self) -> u64 {
        self.lock().next_tx
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().expect("mock gateway poisoned")
    }

    fn ensure_configured(&self) -> Result<(), GatewayError> {
        match &self.lock().config_error {
            Some(message) => Err(GatewayError::Config(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContractGateway for MockGateway {
    async fn token_balance(&self, address: &str) -> Result<u128, GatewayError> {
        self.ensure_configured()?;
        Ok(self
            .lock()
            .balances
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(0))
    }

    async fn action_reward(&self, action: &str) -> Result<u128, GatewayError> {
        self.ensure_configured()?;
        Ok(self.lock().rewards.get(action).copied().unwrap_or(0))
    }

    async fn has_claimed(&self, address: &str, action: &str) -> Result<bool, GatewayError> {
        self.ensure_configured()?;
        Ok(self
            .lock()
            .claimed
            .contains(&(address.to_lowercase(), action.to_string())))
    }

    async fn distribute(
        &self,
        address: &str,
        action: &str,
    ) -> Result<DistributeOutcome, GatewayError> {
        self.ensure_configured()?;
        let mut inner = self.lock();
        let reward = inner.rewards.get(action).copied().unwrap_or(0);
        inner.next_tx += 1;
        let tx_hash = format!("0x{:064x}", inner.next_tx);
        let key = (address.to_lowercase(), action.to_string());
        inner.claimed.insert(key);
        *inner.totals.entry(address.to_lowercase()).or_default() += reward;
        Ok(DistributeOutcome { tx_hash })
    }

    async fn user_total_rewards(&self, address: &str) -> Result<u128, GatewayError> {
        self.ensure_configured()?;
        Ok(self
            .lock()
            .totals
            .get(&address.to_lowercase())
            .copied()
            .unwrap_or(0))
    }

    fn reward_contract(&self) -> &str {
        REWARD_CONTRACT
    }
}

pub struct TestHarness {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::with_default_rewards());
        let state = AppState::new(
            Arc::clone(&store) as Arc<dyn RewardStore>,
            Arc::clone(&gateway) as Arc<dyn ContractGateway>,
        );
        let server = TestServer::new(http::router(state)).expect("router must start");
        Self {
            server,
            store,
            gateway,
        }
    }
}
