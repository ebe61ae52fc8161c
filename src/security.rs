use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of the risk gate for one submit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    Proceed,
    Blocked,
}

/// Risk acknowledgment state of the transaction security analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSecurity {
    /// Set by the security analysis when the transaction was flagged
    pub needs_risk_confirmation: bool,
    /// Set by explicit user action only
    pub is_risk_confirmed: bool,
    /// The user tried to submit without confirming; the UI highlights the warning
    pub is_risk_ignored: bool,
}

impl TxSecurity {
    pub fn new(needs_risk_confirmation: bool) -> Self {
        Self {
            needs_risk_confirmation,
            ..Default::default()
        }
    }

    /// Explicit acknowledgment from the risk checkbox
    pub fn confirm_risk(&mut self) {
        self.is_risk_confirmed = true;
    }

    /// Whether a submit attempt would currently be consumed by the gate
    pub fn is_blocking(&self) -> bool {
        self.needs_risk_confirmation && !self.is_risk_confirmed
    }

    /// Gate one submit attempt.
    ///
    /// The first unconfirmed attempt arms the acknowledgment and is consumed;
    /// the next one proceeds.
    pub fn evaluate(&mut self) -> RiskDecision {
        if self.is_blocking() {
            info!("Risky transaction submitted without confirmation, arming acknowledgment");
            self.is_risk_ignored = true;
            self.is_risk_confirmed = true;
            return RiskDecision::Blocked;
        }
        RiskDecision::Proceed
    }
}
