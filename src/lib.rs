pub mod affordability;
pub mod config;
pub mod counterfactual;
pub mod error;
pub mod flow;
pub mod gas;
pub mod logging;
pub mod mpc;
pub mod params;
pub mod recovery;
pub mod sdk;
pub mod security;
pub mod telemetry;
pub mod types;

pub use alloy_primitives::{Address, Bytes, B256, U256};

pub use affordability::{wallet_can_pay, BalanceOracle};
pub use config::{ChainFeature, ChainInfo, ConsoleConfig};
pub use counterfactual::{
    ExecuteAndDeployProps, ExecuteAndDeploySafeForm, FormServices, SignerAccess, SubmissionState,
    SubmitBlocker, SubmitOutcome, UndeployedSafe, UndeployedSafeRegistry,
};
pub use error::{Error, ErrorKind, RejectionKind};
pub use gas::{GasEstimate, GasEstimator};
pub use mpc::{MpcAuthProvider, MpcWalletContext, MpcWalletProvider, MpcWalletState};
pub use params::{tx_options, AdvancedParams};
pub use recovery::{EmailVerification, RecoveryEmailService, UpsertRecoveryEmailStep};
pub use sdk::{GasPriceOracle, SafeSdk, SafeSdkFactory, TxActions};
pub use security::{RiskDecision, TxSecurity};
pub use telemetry::{ErrorCode, ErrorTracker};
pub use types::{GasPrice, SafeTransaction, SafeTxData, TxOptions};
