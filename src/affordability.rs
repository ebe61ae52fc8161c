//! Checks whether the connected wallet can pay for executing a transaction.

use alloy_primitives::U256;
use async_trait::async_trait;

use crate::error::Error;

/// Spendable balance of the connected wallet on the active chain
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// `None` while the balance is unknown
    async fn wallet_balance(&self) -> Result<Option<U256>, Error>;
}

/// Maximum fee the wallet may be charged
pub fn total_fee(max_fee_per_gas: U256, max_priority_fee_per_gas: Option<U256>, gas_limit: U256) -> U256 {
    max_fee_per_gas
        .saturating_add(max_priority_fee_per_gas.unwrap_or(U256::ZERO))
        .saturating_mul(gas_limit)
}

/// Optimistic affordability check.
///
/// Missing gas limit, max fee or balance means the wallet is assumed able to pay.
pub fn wallet_can_pay(
    gas_limit: Option<U256>,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    wallet_balance: Option<U256>,
) -> bool {
    let (Some(gas_limit), Some(max_fee_per_gas), Some(balance)) = (gas_limit, max_fee_per_gas, wallet_balance)
    else {
        return true;
    };

    balance >= total_fee(max_fee_per_gas, max_priority_fee_per_gas, gas_limit)
}

/// Same check as [`wallet_can_pay`], reporting the shortfall
pub fn ensure_wallet_can_pay(
    gas_limit: Option<U256>,
    max_fee_per_gas: Option<U256>,
    max_priority_fee_per_gas: Option<U256>,
    wallet_balance: Option<U256>,
) -> Result<(), Error> {
    if wallet_can_pay(gas_limit, max_fee_per_gas, max_priority_fee_per_gas, wallet_balance) {
        return Ok(());
    }
    // All three are known when the check fails
    let required = total_fee(
        max_fee_per_gas.unwrap_or_default(),
        max_priority_fee_per_gas,
        gas_limit.unwrap_or_default(),
    );
    Err(Error::InsufficientFunds {
        required,
        available: wallet_balance.unwrap_or_default(),
    })
}
