//! Execute-and-deploy form for counterfactual Safes.
//!
//! The form deploys a Safe that only exists as a predicted address and runs
//! its first transaction in the same wallet interaction. Submission follows a
//! small state machine:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──ok──▶ Completed
//!   ▲                  │
//!   │                  ├──wallet rejection──▶ Idle
//!   │                  └──error──▶ Failed(err) ──submit──▶ Submitting
//! ```
//!
//! The state lives behind an async mutex that is never held across the
//! wallet call, so concurrent submit triggers resolve to a single call.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::affordability::{ensure_wallet_can_pay, BalanceOracle};
use crate::config::ChainInfo;
use crate::counterfactual::store::UndeployedSafeRegistry;
use crate::error::Error;
use crate::flow::TxFlowContainer;
use crate::gas::{DeployGasLimit, GasEstimator};
use crate::params::{tx_options, AdvancedParams};
use crate::sdk::{GasPriceOracle, TxActions};
use crate::security::{RiskDecision, TxSecurity};
use crate::telemetry::{ErrorCode, ErrorTracker};
use crate::types::{GasPrice, SafeTransaction};

/// Label of the submit action
pub const EXECUTE_LABEL: &str = "Execute";
/// Label while the wallet call is in flight
pub const EXECUTING_LABEL: &str = "Executing";

/// Inputs handed to the form by the surrounding transaction flow
#[derive(Debug, Clone, Default)]
pub struct ExecuteAndDeployProps {
    pub safe_tx: Option<SafeTransaction>,
    /// Disabled externally by the flow
    pub disable_submit: bool,
    /// Execution without proposing; non-owners may execute
    pub only_execute: bool,
    /// The transaction is being created, not signed from the queue
    pub is_creation: bool,
}

/// What the connected account is allowed to do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignerAccess {
    pub is_owner: bool,
    /// The connected account is the Safe itself
    pub is_execution_loop: bool,
}

/// External collaborators of the form
#[derive(Clone)]
pub struct FormServices {
    pub tx_actions: Arc<dyn TxActions>,
    pub registry: Arc<dyn UndeployedSafeRegistry>,
    pub tx_flow: Arc<dyn TxFlowContainer>,
    pub error_tracker: Arc<dyn ErrorTracker>,
}

/// Submission state of one flow instance
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Failed(Arc<Error>),
    Completed,
}

impl SubmissionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionState::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SubmissionState::Failed(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SubmissionState::Completed)
    }
}

/// Static precondition preventing a submit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlocker {
    MissingTransaction,
    InFlight,
    Completed,
    Disabled,
    CannotPropose,
    ExecutionLoop,
    InsufficientFunds,
}

/// Result of one submit attempt
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// A precondition failed; nothing was sent
    Blocked(SubmitBlocker),
    /// The click armed the risk acknowledgment; nothing was sent
    RiskAcknowledgmentRequired,
    /// The signer declined; back to idle
    Rejected,
    /// The wallet call failed
    Failed(Arc<Error>),
    /// Safe deployed and transaction executed
    Executed(B256),
}

/// Notice shown above the form actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    NonOwner,
    ExecutionLoop,
    InsufficientFunds,
    /// Gas estimation failed, the transaction will most likely revert
    WillLikelyFail { error: String, is_creation: bool },
}

impl fmt::Display for FormNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormNotice::NonOwner => write!(
                f,
                "You are currently not a signer of this Safe Account and won't be able to submit this transaction."
            ),
            FormNotice::ExecutionLoop => write!(
                f,
                "Cannot execute a transaction from the Safe Account itself, please connect a different account."
            ),
            FormNotice::InsufficientFunds => write!(
                f,
                "Your connected wallet doesn't have enough funds to execute this transaction."
            ),
            FormNotice::WillLikelyFail { is_creation, .. } => write!(
                f,
                "This transaction will most likely fail. To save gas costs, {} this transaction.",
                if *is_creation { "avoid creating" } else { "reject" }
            ),
        }
    }
}

/// Message shown under the form when the last submission failed
pub const SUBMIT_ERROR_MESSAGE: &str = "Error submitting the transaction. Please try again.";

#[derive(Debug, Default)]
struct FormState {
    submission: SubmissionState,
    security: TxSecurity,
    gas: DeployGasLimit,
    manual_params: Option<AdvancedParams>,
    gas_price: GasPrice,
    user_nonce: Option<u64>,
    wallet_balance: Option<U256>,
}

impl FormState {
    fn advanced_params(&self) -> AdvancedParams {
        AdvancedParams::resolve(
            self.manual_params.as_ref(),
            self.gas.gas_limit(),
            self.gas_price,
            self.user_nonce,
        )
    }

    fn affordability(&self) -> Result<(), Error> {
        let params = self.advanced_params();
        ensure_wallet_can_pay(
            params.gas_limit,
            params.max_fee_per_gas,
            params.max_priority_fee_per_gas,
            self.wallet_balance,
        )
    }

    fn wallet_can_pay(&self) -> bool {
        self.affordability().is_ok()
    }
}

/// Controller of the execute-and-deploy form
pub struct ExecuteAndDeploySafeForm {
    chain: ChainInfo,
    safe_address: Address,
    props: ExecuteAndDeployProps,
    access: SignerAccess,
    services: FormServices,
    state: Mutex<FormState>,
}

impl ExecuteAndDeploySafeForm {
    pub fn new(
        chain: ChainInfo,
        safe_address: Address,
        props: ExecuteAndDeployProps,
        access: SignerAccess,
        security: TxSecurity,
        services: FormServices,
    ) -> Self {
        Self {
            chain,
            safe_address,
            props,
            access,
            services,
            state: Mutex::new(FormState {
                security,
                ..Default::default()
            }),
        }
    }

    pub fn chain(&self) -> &ChainInfo {
        &self.chain
    }

    pub fn safe_address(&self) -> Address {
        self.safe_address
    }

    /// Re-run the gas estimation for the current transaction
    pub async fn update_gas_limit(&self, estimator: &GasEstimator) {
        let generation = self.state.lock().await.gas.start();
        let result = estimator.estimate(self.props.safe_tx.as_ref()).await;
        self.state.lock().await.gas.finish(generation, result);
    }

    /// Refresh the network fee suggestion; failures keep the previous value
    pub async fn update_gas_price(&self, oracle: &dyn GasPriceOracle) {
        match oracle.gas_price().await {
            Ok(price) => self.state.lock().await.gas_price = price,
            Err(e) => warn!("Failed to fetch gas price: {}", e),
        }
    }

    /// Refresh the connected wallet balance; failures make it unknown
    pub async fn update_wallet_balance(&self, oracle: &dyn BalanceOracle) {
        let balance = match oracle.wallet_balance().await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Failed to fetch wallet balance: {}", e);
                None
            }
        };
        self.state.lock().await.wallet_balance = balance;
    }

    /// Refresh gas limit, fees and balance concurrently
    pub async fn refresh(
        &self,
        estimator: &GasEstimator,
        gas_price: &dyn GasPriceOracle,
        balance: &dyn BalanceOracle,
    ) {
        futures::join!(
            self.update_gas_limit(estimator),
            self.update_gas_price(gas_price),
            self.update_wallet_balance(balance),
        );
    }

    pub async fn set_gas_price(&self, gas_price: GasPrice) {
        self.state.lock().await.gas_price = gas_price;
    }

    pub async fn set_wallet_balance(&self, balance: Option<U256>) {
        self.state.lock().await.wallet_balance = balance;
    }

    pub async fn set_user_nonce(&self, nonce: Option<u64>) {
        self.state.lock().await.user_nonce = nonce;
    }

    /// Apply the advanced parameters the user submitted
    pub async fn set_advanced_params(&self, manual: AdvancedParams) {
        self.state.lock().await.manual_params = Some(manual);
    }

    /// Explicit risk acknowledgment from the checkbox
    pub async fn confirm_risk(&self) {
        self.state.lock().await.security.confirm_risk();
    }

    pub async fn security(&self) -> TxSecurity {
        self.state.lock().await.security
    }

    pub async fn advanced_params(&self) -> AdvancedParams {
        self.state.lock().await.advanced_params()
    }

    pub async fn gas_limit(&self) -> DeployGasLimit {
        self.state.lock().await.gas.clone()
    }

    pub async fn submission_state(&self) -> SubmissionState {
        self.state.lock().await.submission.clone()
    }

    /// Error of the last failed submission
    pub async fn submit_error(&self) -> Option<Arc<Error>> {
        match &self.state.lock().await.submission {
            SubmissionState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Message to show under the form after a failed submission
    pub async fn submit_error_message(&self) -> Option<&'static str> {
        self.state
            .lock()
            .await
            .submission
            .is_failed()
            .then_some(SUBMIT_ERROR_MESSAGE)
    }

    pub async fn submit_label(&self) -> &'static str {
        if self.is_submitting().await {
            EXECUTING_LABEL
        } else {
            EXECUTE_LABEL
        }
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.submission.is_submitting()
    }

    pub async fn wallet_can_pay(&self) -> bool {
        self.state.lock().await.wallet_can_pay()
    }

    /// Affordability of the current parameters, with the shortfall on failure
    pub async fn affordability(&self) -> Result<(), Error> {
        self.state.lock().await.affordability()
    }

    pub async fn submit_blockers(&self) -> Vec<SubmitBlocker> {
        let state = self.state.lock().await;
        self.blockers(&state)
    }

    pub async fn is_submit_disabled(&self) -> bool {
        !self.submit_blockers().await.is_empty()
    }

    /// Highest-priority notice for the current state
    pub async fn notice(&self) -> Option<FormNotice> {
        let state = self.state.lock().await;

        if self.cannot_propose() {
            Some(FormNotice::NonOwner)
        } else if self.access.is_execution_loop {
            Some(FormNotice::ExecutionLoop)
        } else if !state.wallet_can_pay() {
            Some(FormNotice::InsufficientFunds)
        } else {
            state.gas.error.as_ref().map(|error| FormNotice::WillLikelyFail {
                error: error.clone(),
                is_creation: self.props.is_creation,
            })
        }
    }

    fn cannot_propose(&self) -> bool {
        !self.access.is_owner && !self.props.only_execute
    }

    fn blockers(&self, state: &FormState) -> Vec<SubmitBlocker> {
        let mut blockers = Vec::new();
        if self.props.safe_tx.is_none() {
            blockers.push(SubmitBlocker::MissingTransaction);
        }
        match state.submission {
            SubmissionState::Submitting => blockers.push(SubmitBlocker::InFlight),
            SubmissionState::Completed => blockers.push(SubmitBlocker::Completed),
            SubmissionState::Idle | SubmissionState::Failed(_) => {}
        }
        if self.props.disable_submit {
            blockers.push(SubmitBlocker::Disabled);
        }
        if self.cannot_propose() {
            blockers.push(SubmitBlocker::CannotPropose);
        }
        if self.access.is_execution_loop {
            blockers.push(SubmitBlocker::ExecutionLoop);
        }
        if !state.wallet_can_pay() {
            blockers.push(SubmitBlocker::InsufficientFunds);
        }
        blockers
    }

    /// Submit the form.
    ///
    /// Side effects of a successful call happen in order: registry record
    /// removal, then flow dismissal.
    pub async fn handle_submit(&self) -> SubmitOutcome {
        let (options, safe_tx) = {
            let mut state = self.state.lock().await;

            if let Some(blocker) = self.blockers(&state).first().copied() {
                match state.affordability() {
                    Err(e) if blocker == SubmitBlocker::InsufficientFunds => {
                        warn!(safe = %self.safe_address, "Submit blocked: {}", e)
                    }
                    _ => debug!(?blocker, "Submit ignored"),
                }
                return SubmitOutcome::Blocked(blocker);
            }

            if state.security.evaluate() == RiskDecision::Blocked {
                return SubmitOutcome::RiskAcknowledgmentRequired;
            }

            let Some(safe_tx) = self.props.safe_tx.clone() else {
                return SubmitOutcome::Blocked(SubmitBlocker::MissingTransaction);
            };

            state.submission = SubmissionState::Submitting;
            (tx_options(&state.advanced_params(), Some(&self.chain)), safe_tx)
        };

        info!(
            chain_id = self.chain.chain_id,
            safe = %self.safe_address,
            "Deploying Safe and executing transaction"
        );

        match self
            .services
            .tx_actions
            .deploy_safe_and_execute_tx(options, &safe_tx)
            .await
        {
            Ok(tx_hash) => {
                info!(%tx_hash, "Safe deployed and transaction executed");

                // Best effort: a stale record is harmless
                match self
                    .services
                    .registry
                    .remove(self.chain.chain_id, self.safe_address)
                {
                    Ok(true) => debug!(safe = %self.safe_address, "Removed undeployed Safe"),
                    Ok(false) => warn!(safe = %self.safe_address, "No undeployed Safe record to remove"),
                    Err(e) => warn!("Failed to remove undeployed Safe: {}", e),
                }

                self.state.lock().await.submission = SubmissionState::Completed;
                self.services.tx_flow.dismiss();
                SubmitOutcome::Executed(tx_hash)
            }
            Err(e) if e.is_wallet_rejection() => {
                warn!("Wallet rejected the deploy and execute request: {}", e);
                self.state.lock().await.submission = SubmissionState::Idle;
                SubmitOutcome::Rejected
            }
            Err(e) => {
                self.services
                    .error_tracker
                    .track_error(ErrorCode::TxExecution, &e);
                let e = Arc::new(e);
                self.state.lock().await.submission = SubmissionState::Failed(e.clone());
                SubmitOutcome::Failed(e)
            }
        }
    }
}
