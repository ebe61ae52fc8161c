//! Recovery module setup flow.

pub mod email;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

pub use email::{
    is_valid_email, validate_email, ContinueAction, EmailVerification, RecoveryEmailService,
    SignerEmail, UpsertRecoveryEmailStep, EMAIL_PATTERN,
};

/// Parameters collected by the recovery setup flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecoveryFlowProps {
    /// Account allowed to start a recovery
    pub recoverer: Address,
    /// Review window in seconds before a recovery can be executed
    pub delay: u64,
    /// Seconds after which an unexecuted recovery expires; 0 disables expiry
    pub expiry: u64,
    pub email_address: Option<String>,
    #[serde(default)]
    pub verified: EmailVerification,
}
