use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;
use crate::recovery::UpsertRecoveryFlowProps;

/// Pattern a recovery email address has to match
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), Error> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(Error::Validation("Enter a valid email address".to_string()))
    }
}

/// Verification status of the recovery email
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailVerification {
    /// No email has been read from or registered with the service yet
    #[default]
    Unknown,
    Unverified,
    Verified,
}

impl From<bool> for EmailVerification {
    fn from(verified: bool) -> Self {
        if verified {
            EmailVerification::Verified
        } else {
            EmailVerification::Unverified
        }
    }
}

/// Email registered for the connected signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEmail {
    pub email: String,
    pub verified: bool,
}

/// Email notification service of the recovery module
#[async_trait]
pub trait RecoveryEmailService: Send + Sync {
    /// Requires a signature; `None` when no email is registered
    async fn get_signer_email_address(&self) -> Result<Option<SignerEmail>, Error>;

    /// Register an address and send a verification code to it
    async fn register_email_address(&self, email: &str) -> Result<(), Error>;
}

/// What the continue action does in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueAction {
    /// Sign to read the registered email, registering the typed one if absent
    SignAndVerify,
    /// Open the verification dialog
    Verify,
    /// Submit the step
    Continue,
}

impl ContinueAction {
    pub fn label(&self) -> &'static str {
        match self {
            ContinueAction::SignAndVerify => "Sign & Verify",
            ContinueAction::Verify => "Verify",
            ContinueAction::Continue => "Continue",
        }
    }
}

/// Email step of the recovery setup flow
pub struct UpsertRecoveryEmailStep {
    params: UpsertRecoveryFlowProps,
    email_address: String,
    verified: EmailVerification,
    dirty: bool,
    verify_email_open: bool,
    service: Arc<dyn RecoveryEmailService>,
}

impl UpsertRecoveryEmailStep {
    pub fn new(params: UpsertRecoveryFlowProps, service: Arc<dyn RecoveryEmailService>) -> Self {
        Self {
            email_address: params.email_address.clone().unwrap_or_default(),
            verified: params.verified,
            dirty: false,
            verify_email_open: false,
            params,
            service,
        }
    }

    pub fn email_address(&self) -> &str {
        &self.email_address
    }

    pub fn verification(&self) -> EmailVerification {
        self.verified
    }

    pub fn set_email_address(&mut self, email: impl Into<String>) {
        self.email_address = email.into();
        self.dirty = true;
    }

    /// An edited field that does not match the pattern
    pub fn is_invalid_email(&self) -> bool {
        self.dirty && !self.email_address.is_empty() && !is_valid_email(&self.email_address)
    }

    pub fn helper_text(&self) -> &'static str {
        if self.is_invalid_email() {
            "Enter a valid email address"
        } else {
            "We will send a verification code to this email"
        }
    }

    pub fn continue_action(&self) -> ContinueAction {
        match self.verified {
            EmailVerification::Unknown => ContinueAction::SignAndVerify,
            EmailVerification::Unverified => ContinueAction::Verify,
            EmailVerification::Verified => ContinueAction::Continue,
        }
    }

    pub fn is_continue_disabled(&self) -> bool {
        self.is_invalid_email() || self.email_address.is_empty()
    }

    /// "Skip for now" is only offered before an email is known
    pub fn can_skip(&self) -> bool {
        self.verified == EmailVerification::Unknown
    }

    pub fn is_verify_email_open(&self) -> bool {
        self.verify_email_open
    }

    pub fn toggle_verify_email_dialog(&mut self) {
        self.verify_email_open = !self.verify_email_open;
    }

    pub fn on_verify_success(&mut self) {
        self.toggle_verify_email_dialog();
        self.verified = EmailVerification::Verified;
    }

    /// Read the signer's registered email, registering the typed one otherwise.
    ///
    /// The service answers a missing email with an error, so any error that
    /// is not a wallet rejection falls through to registration.
    pub async fn sign_to_view_email(&mut self) -> Result<(), Error> {
        match self.service.get_signer_email_address().await {
            Ok(Some(response)) => {
                debug!(verified = response.verified, "Loaded signer email");
                self.email_address = response.email;
                self.verified = response.verified.into();
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) if e.is_wallet_rejection() => Ok(()),
            Err(e) => {
                debug!("No signer email found ({}), registering", e);
                self.register_email().await
            }
        }
    }

    /// Register the typed address and open the verification dialog
    pub async fn register_email(&mut self) -> Result<(), Error> {
        validate_email(&self.email_address)?;

        match self.service.register_email_address(&self.email_address).await {
            Ok(()) => {
                info!("Registered recovery email");
                self.verified = EmailVerification::Unverified;
                self.toggle_verify_email_dialog();
                Ok(())
            }
            Err(e) if e.is_wallet_rejection() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Submit the step, merging the email into the flow parameters
    pub fn submit(&self) -> Result<UpsertRecoveryFlowProps, Error> {
        if !self.email_address.is_empty() {
            validate_email(&self.email_address)?;
        }

        Ok(UpsertRecoveryFlowProps {
            email_address: (!self.email_address.is_empty()).then(|| self.email_address.clone()),
            verified: self.verified,
            ..self.params.clone()
        })
    }

    /// Run the continue action; returns the submitted parameters on `Continue`
    pub async fn press_continue(&mut self) -> Result<Option<UpsertRecoveryFlowProps>, Error> {
        if self.is_continue_disabled() {
            return Err(Error::Validation("Enter a valid email address".to_string()));
        }

        match self.continue_action() {
            ContinueAction::SignAndVerify => {
                self.sign_to_view_email().await?;
                Ok(None)
            }
            ContinueAction::Verify => {
                self.toggle_verify_email_dialog();
                Ok(None)
            }
            ContinueAction::Continue => self.submit().map(Some),
        }
    }
}
