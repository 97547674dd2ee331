use crate::tiers::{Tier, TierAccess};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Subscription lookup. Implementations typically front a payments provider.
#[async_trait]
pub trait TierVerifier: Send + Sync {
    async fn verify(&self, subscriber_id: &str) -> Result<TierAccess>;
}

/// Fixed subscriber → tier grants, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTierVerifier {
    grants: HashMap<String, Tier>,
}

impl StaticTierVerifier {
    pub fn new(grants: HashMap<String, Tier>) -> Self {
        Self { grants }
    }
}

#[async_trait]
impl TierVerifier for StaticTierVerifier {
    async fn verify(&self, subscriber_id: &str) -> Result<TierAccess> {
        Ok(match self.grants.get(subscriber_id) {
            Some(&tier) => TierAccess {
                has_access: true,
                tier,
            },
            None => TierAccess::free(),
        })
    }
}
