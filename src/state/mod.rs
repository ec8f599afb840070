use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::rpc::ContractGateway;
use crate::storage::RewardStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RewardStore>,
    pub gateway: Arc<dyn ContractGateway>,
    pub start_time: Instant,
    claims_in_flight: Arc<Mutex<HashSet<(String, String)>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn RewardStore>, gateway: Arc<dyn ContractGateway>) -> Self {
        assert!(
            Arc::strong_count(&store) >= 1,
            "Storage handle must be shared"
        );
        Self {
            store,
            gateway,
            start_time: Instant::now(),
            claims_in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Serialize claim attempts per (user, action) pair within this
    /// process. Returns `None` when an identical claim is already in
    /// flight. The reservation is released when the guard drops.
    ///
    /// This does not extend across processes: two API instances can still
    /// both pass the on-chain `has_claimed` check for the same pair.
    pub fn begin_claim(&self, user_address: &str, action: &str) -> Option<ClaimGuard> {
        let key = (user_address.to_string(), action.to_string());
        let mut in_flight = self
            .claims_in_flight
            .lock()
            .expect("claim set poisoned");
        if !in_flight.insert(key.clone()) {
            return None;
        }
        Some(ClaimGuard {
            claims: Arc::clone(&self.claims_in_flight),
            key,
        })
    }
}

pub struct ClaimGuard {
    claims: Arc<Mutex<HashSet<(String, String)>>>,
    key: (String, String),
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let mut in_flight = self.claims.lock().expect("claim set poisoned");
        let removed = in_flight.remove(&self.key);
        assert!(removed, "Claim guard released an absent reservation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{ContractGateway, DistributeOutcome, GatewayError};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    struct NullGateway;

    #[async_trait]
    impl ContractGateway for NullGateway {
        async fn token_balance(&self, _address: &str) -> Result<u128, GatewayError> {
            Ok(0)
        }
        async fn action_reward(&self, _action: &str) -> Result<u128, GatewayError> {
            Ok(0)
        }
        async fn has_claimed(&self, _address: &str, _action: &str) -> Result<bool, GatewayError> {
            Ok(false)
        }
        async fn distribute(
            &self,
            _address: &str,
            _action: &str,
        ) -> Result<DistributeOutcome, GatewayError> {
            Err(GatewayError::Upstream("unreachable".to_string()))
        }
        async fn user_total_rewards(&self, _address: &str) -> Result<u128, GatewayError> {
            Ok(0)
        }
        fn reward_contract(&self) -> &str {
            "0x0000000000000000000000000000000000000000"
        }
    }

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), Arc::new(NullGateway))
    }

    #[test]
    fn test_claim_guard_excludes_duplicates() {
        let state = state();
        let guard = state.begin_claim("0xaaa", "signup");
        assert!(guard.is_some());
        assert!(state.begin_claim("0xaaa", "signup").is_none());
        // A different pair is unaffected
        assert!(state.begin_claim("0xaaa", "login").is_some());

        drop(guard);
        assert!(state.begin_claim("0xaaa", "signup").is_some());
    }
}
