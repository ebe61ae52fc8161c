//! MPC (managed key) wallet session.
//!
//! [`MpcWalletProvider`] owns the session for the whole process: it is created
//! when the console mounts the provider and torn down on logout or account
//! reset. Everything else reads the session through a
//! [`MpcWalletContextHandle`], which cannot mutate it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::Error;

/// Lifecycle of the MPC signer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MpcWalletState {
    #[default]
    NotInitialized,
    Authenticating,
    /// Logged in, but a key factor has to be recovered (e.g. by password)
    ManualRecovery,
    Ready,
}

/// Profile of the logged in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: Option<String>,
}

/// Custodial-key login infrastructure
#[async_trait]
pub trait MpcAuthProvider: Send + Sync {
    /// Log in and reconstruct the signer; returns the resulting state
    async fn login(&self) -> Result<MpcWalletState, Error>;

    async fn logout(&self) -> Result<(), Error>;

    /// Delete the key shares of the account
    async fn reset_account(&self) -> Result<(), Error>;

    /// Create or replace the password recovery factor
    async fn upsert_password_backup(&self, password: &str) -> Result<(), Error>;

    /// Recover the missing factor with the backup password
    async fn recover_factor_with_password(&self, password: &str) -> Result<(), Error>;

    /// Current state of the signer as seen by the provider
    async fn wallet_state(&self) -> Result<MpcWalletState, Error>;

    async fn user_info(&self) -> Result<UserInfo, Error>;
}

/// Read-only view of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MpcWalletContext {
    pub login_pending: bool,
    pub wallet_state: MpcWalletState,
    pub user_info: UserInfo,
}

impl MpcWalletContext {
    fn new(wallet_state: MpcWalletState, user_info: UserInfo) -> Self {
        Self {
            login_pending: wallet_state == MpcWalletState::Authenticating,
            wallet_state,
            user_info,
        }
    }
}

/// Consumer handle on the session
#[derive(Debug, Clone)]
pub struct MpcWalletContextHandle {
    receiver: watch::Receiver<MpcWalletContext>,
}

impl MpcWalletContextHandle {
    /// Snapshot of the current session
    pub fn current(&self) -> MpcWalletContext {
        self.receiver.borrow().clone()
    }

    /// Wait for the next session change; errors once the provider is gone
    pub async fn changed(&mut self) -> Result<MpcWalletContext, Error> {
        self.receiver
            .changed()
            .await
            .map_err(|_| Error::Auth("MPC wallet provider unmounted".to_string()))?;
        Ok(self.receiver.borrow_and_update().clone())
    }
}

/// Owner of the MPC session
pub struct MpcWalletProvider {
    auth: Arc<dyn MpcAuthProvider>,
    context: watch::Sender<MpcWalletContext>,
}

impl MpcWalletProvider {
    /// Mount the provider with an uninitialized session
    pub fn mount(auth: Arc<dyn MpcAuthProvider>) -> Self {
        let (context, _) = watch::channel(MpcWalletContext::default());
        Self { auth, context }
    }

    pub fn subscribe(&self) -> MpcWalletContextHandle {
        MpcWalletContextHandle {
            receiver: self.context.subscribe(),
        }
    }

    pub fn context(&self) -> MpcWalletContext {
        self.context.borrow().clone()
    }

    fn publish(&self, wallet_state: MpcWalletState, user_info: UserInfo) {
        debug!(?wallet_state, "MPC wallet state changed");
        self.context
            .send_replace(MpcWalletContext::new(wallet_state, user_info));
    }

    fn teardown(&self) {
        self.context.send_replace(MpcWalletContext::default());
    }

    async fn load_user_info(&self) -> UserInfo {
        match self.auth.user_info().await {
            Ok(info) => info,
            Err(e) => {
                warn!("Failed to load MPC user info: {}", e);
                UserInfo::default()
            }
        }
    }

    /// Start the social login; a login already in progress is not restarted
    pub async fn trigger_login(&self) -> Result<MpcWalletState, Error> {
        // Check and claim the pending login in one step
        let mut started = false;
        self.context.send_if_modified(|context| {
            if context.login_pending {
                return false;
            }
            *context =
                MpcWalletContext::new(MpcWalletState::Authenticating, context.user_info.clone());
            started = true;
            true
        });
        if !started {
            debug!("MPC login already in progress");
            return Ok(self.context().wallet_state);
        }

        match self.auth.login().await {
            Ok(state) => {
                let user_info = self.load_user_info().await;
                info!(?state, "MPC login finished");
                self.publish(state, user_info);
                Ok(state)
            }
            Err(e) => {
                if e.is_wallet_rejection() {
                    debug!("MPC login dismissed by the user");
                } else {
                    warn!("MPC login failed: {}", e);
                }
                self.teardown();
                Err(e)
            }
        }
    }

    /// Re-read the signer state from the auth provider, e.g. after a page of
    /// the login popup finished out of band
    pub async fn sync_wallet_state(&self) -> Result<MpcWalletState, Error> {
        let current = self.context();
        let state = self.auth.wallet_state().await?;
        if state != current.wallet_state {
            let user_info = match state {
                MpcWalletState::NotInitialized => UserInfo::default(),
                _ => self.load_user_info().await,
            };
            self.publish(state, user_info);
        }
        Ok(state)
    }

    pub async fn logout(&self) -> Result<(), Error> {
        self.auth.logout().await?;
        self.teardown();
        info!("MPC wallet logged out");
        Ok(())
    }

    /// Reset the account and tear the session down
    pub async fn reset_account(&self) -> Result<(), Error> {
        self.auth.reset_account().await?;
        self.teardown();
        info!("MPC account reset");
        Ok(())
    }

    pub async fn upsert_password_backup(&self, password: &str) -> Result<(), Error> {
        if self.context().wallet_state != MpcWalletState::Ready {
            return Err(Error::NotReady(
                "MPC wallet must be ready to set a password backup".to_string(),
            ));
        }
        self.auth.upsert_password_backup(password).await
    }

    /// Recover the missing factor; the session becomes ready on success
    pub async fn recover_factor_with_password(&self, password: &str) -> Result<(), Error> {
        if self.context().wallet_state != MpcWalletState::ManualRecovery {
            return Err(Error::NotReady(
                "No factor recovery is pending for the MPC wallet".to_string(),
            ));
        }
        self.auth.recover_factor_with_password(password).await?;
        let user_info = self.load_user_info().await;
        self.publish(MpcWalletState::Ready, user_info);
        Ok(())
    }
}

impl Drop for MpcWalletProvider {
    fn drop(&mut self) {
        self.teardown();
    }
}
