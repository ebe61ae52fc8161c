//! Collaborator traits for the Safe contract SDK and the connected wallet.
//!
//! Implementations live outside this crate (protocol kit bindings, an RPC
//! provider, a browser wallet bridge). The console only depends on these
//! seams so every flow can be driven by test doubles.

use std::sync::Arc;

use alloy_primitives::{B256, U256};
use async_trait::async_trait;

use crate::error::Error;
use crate::types::{GasPrice, SafeTransaction, TxOptions};

/// Safe SDK bound to a signer on one chain
#[async_trait]
pub trait SafeSdk: Send + Sync {
    /// Gas the outer Ethereum transaction needs on top of the Safe call
    async fn estimate_tx_base_gas(&self, tx: &SafeTransaction) -> Result<U256, Error>;

    /// Gas consumed by the Safe transaction itself
    async fn estimate_safe_tx_gas(&self, tx: &SafeTransaction) -> Result<U256, Error>;

    /// Gas for deploying the Safe proxy
    async fn estimate_safe_deployment_gas(&self) -> Result<U256, Error>;
}

/// Creates a signer-bound SDK for the connected wallet
#[async_trait]
pub trait SafeSdkFactory: Send + Sync {
    async fn sdk_with_signer(&self, chain_id: u64) -> Result<Arc<dyn SafeSdk>, Error>;
}

/// Transaction actions that reach the wallet
#[async_trait]
pub trait TxActions: Send + Sync {
    /// Deploy the counterfactual Safe and execute its first transaction in one go
    async fn deploy_safe_and_execute_tx(
        &self,
        options: TxOptions,
        tx: &SafeTransaction,
    ) -> Result<B256, Error>;
}

/// Network fee suggestion source
#[async_trait]
pub trait GasPriceOracle: Send + Sync {
    async fn gas_price(&self) -> Result<GasPrice, Error>;
}
