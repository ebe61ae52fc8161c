use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::config::{ChainFeature, ChainInfo};
use crate::types::{GasPrice, TxOptions};

/// User-adjustable gas and fee parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedParams {
    pub gas_limit: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub user_nonce: Option<u64>,
}

impl AdvancedParams {
    /// Overlay manual overrides on the recommended values, field by field
    pub fn resolve(
        manual: Option<&AdvancedParams>,
        recommended_gas_limit: Option<U256>,
        gas_price: GasPrice,
        user_nonce: Option<u64>,
    ) -> Self {
        let manual = manual.copied().unwrap_or_default();
        Self {
            gas_limit: manual.gas_limit.or(recommended_gas_limit),
            max_fee_per_gas: manual.max_fee_per_gas.or(gas_price.max_fee_per_gas),
            max_priority_fee_per_gas: manual
                .max_priority_fee_per_gas
                .or(gas_price.max_priority_fee_per_gas),
            user_nonce: manual.user_nonce.or(user_nonce),
        }
    }
}

/// Convert advanced parameters into wallet execution options for a chain
pub fn tx_options(params: &AdvancedParams, chain: Option<&ChainInfo>) -> TxOptions {
    let mut options = TxOptions {
        gas_limit: params.gas_limit,
        max_fee_per_gas: params.max_fee_per_gas,
        max_priority_fee_per_gas: params.max_priority_fee_per_gas,
        gas_price: None,
        nonce: params.user_nonce,
    };

    // Legacy chains take a single gas price
    if let Some(chain) = chain {
        if !chain.has_feature(ChainFeature::Eip1559) {
            options.gas_price = options.max_fee_per_gas.take();
            options.max_priority_fee_per_gas = None;
        }
    }

    options
}
