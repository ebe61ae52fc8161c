use std::sync::Arc;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::sdk::SafeSdkFactory;
use crate::types::SafeTransaction;

/// Gas components of a deploy-and-execute transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub base_gas: U256,
    pub safe_tx_gas: U256,
    pub deployment_gas: U256,
}

impl GasEstimate {
    pub fn total(&self) -> U256 {
        self.base_gas
            .saturating_add(self.safe_tx_gas)
            .saturating_add(self.deployment_gas)
    }
}

/// Estimates the gas limit for deploying a Safe together with its first transaction
pub struct GasEstimator {
    sdk_factory: Option<Arc<dyn SafeSdkFactory>>,
    chain_id: u64,
}

impl GasEstimator {
    /// `sdk_factory` is `None` while no wallet is connected
    pub fn new(sdk_factory: Option<Arc<dyn SafeSdkFactory>>, chain_id: u64) -> Self {
        Self {
            sdk_factory,
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Query all three gas components.
    ///
    /// Returns `Ok(None)` when there is no transaction or no connected signer,
    /// including a factory that reports [`Error::NotReady`].
    /// Any failing component fails the whole estimate.
    pub async fn estimate(&self, safe_tx: Option<&SafeTransaction>) -> Result<Option<GasEstimate>, Error> {
        let (Some(safe_tx), Some(factory)) = (safe_tx, self.sdk_factory.as_ref()) else {
            return Ok(None);
        };

        let sdk = match factory.sdk_with_signer(self.chain_id).await {
            Ok(sdk) => sdk,
            Err(Error::NotReady(reason)) => {
                debug!(chain_id = self.chain_id, %reason, "Signer not ready, skipping gas estimation");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let base_gas = sdk.estimate_tx_base_gas(safe_tx).await?;
        let safe_tx_gas = sdk.estimate_safe_tx_gas(safe_tx).await?;
        let deployment_gas = sdk.estimate_safe_deployment_gas().await?;

        let estimate = GasEstimate {
            base_gas,
            safe_tx_gas,
            deployment_gas,
        };
        debug!(
            chain_id = self.chain_id,
            %base_gas,
            %safe_tx_gas,
            %deployment_gas,
            total = %estimate.total(),
            "Estimated deploy and execute gas"
        );
        Ok(Some(estimate))
    }
}

/// Last known result of the gas limit estimation
#[derive(Debug, Clone, Default)]
pub struct DeployGasLimit {
    pub estimate: Option<GasEstimate>,
    pub error: Option<String>,
    pub loading: bool,
    /// Id of the latest started request; older results are discarded
    generation: u64,
}

impl DeployGasLimit {
    /// Summed gas limit, only defined when every component resolved
    pub fn gas_limit(&self) -> Option<U256> {
        self.estimate.as_ref().map(GasEstimate::total)
    }

    /// Mark a new estimation as started, keeping the previous value visible.
    ///
    /// Returns the request id to hand back to [`DeployGasLimit::finish`].
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Record an estimation outcome; returns `false` if a newer request was
    /// started since and the outcome was dropped
    pub fn finish(&mut self, generation: u64, result: Result<Option<GasEstimate>, Error>) -> bool {
        if generation != self.generation {
            debug!(generation, current = self.generation, "Dropping superseded gas estimate");
            return false;
        }

        self.loading = false;
        match result {
            Ok(estimate) => {
                self.estimate = estimate;
                self.error = None;
            }
            Err(e) => {
                warn!("Gas limit estimation failed: {}", e);
                self.estimate = None;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Run the estimator and record its outcome
    pub async fn refresh(&mut self, estimator: &GasEstimator, safe_tx: Option<&SafeTransaction>) {
        let generation = self.start();
        let result = estimator.estimate(safe_tx).await;
        self.finish(generation, result);
    }
}
