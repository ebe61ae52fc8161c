mod utils;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use safe_console_sdk::{mpc::MpcWalletProvider, Error, MpcWalletContext, MpcWalletState};
use utils::test_utils::*;

#[tokio::test]
async fn test_login_publishes_ready_session() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::Ready)));
    let provider = MpcWalletProvider::mount(auth);
    let handle = provider.subscribe();

    assert_eq!(handle.current().wallet_state, MpcWalletState::NotInitialized);

    let state = provider.trigger_login().await.unwrap();
    assert_eq!(state, MpcWalletState::Ready);

    let context = handle.current();
    assert_eq!(context.wallet_state, MpcWalletState::Ready);
    assert!(!context.login_pending);
    assert_eq!(context.user_info.email.as_deref(), Some("owner@example.com"));
}

#[tokio::test]
async fn test_login_failure_tears_session_down() {
    let auth = Arc::new(MockAuth::new(Err("popup closed".to_string())));
    let provider = MpcWalletProvider::mount(auth);

    let error = provider.trigger_login().await.unwrap_err();
    assert!(matches!(error, Error::Auth(_)));
    assert_eq!(provider.context().wallet_state, MpcWalletState::NotInitialized);
    assert!(!provider.context().login_pending);
}

#[tokio::test]
async fn test_manual_recovery_then_ready() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::ManualRecovery)));
    let provider = MpcWalletProvider::mount(auth.clone());

    assert_eq!(provider.trigger_login().await.unwrap(), MpcWalletState::ManualRecovery);

    // Backups need a ready signer
    assert!(provider.upsert_password_backup("secret").await.is_err());

    assert!(provider.recover_factor_with_password("wrong").await.is_err());
    assert_eq!(provider.context().wallet_state, MpcWalletState::ManualRecovery);

    provider
        .recover_factor_with_password("correct horse battery staple")
        .await
        .unwrap();
    assert_eq!(provider.context().wallet_state, MpcWalletState::Ready);
    assert_eq!(auth.recovered.load(Ordering::SeqCst), 1);

    provider.upsert_password_backup("new secret").await.unwrap();
    assert_eq!(*auth.backups.lock().unwrap(), vec!["new secret".to_string()]);
}

#[tokio::test]
async fn test_recovery_requires_pending_factor() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::Ready)));
    let provider = MpcWalletProvider::mount(auth.clone());

    let error = provider
        .recover_factor_with_password("correct horse battery staple")
        .await
        .unwrap_err();
    assert!(matches!(error, Error::NotReady(_)));
    assert_eq!(auth.recovered.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logout_and_reset_clear_session() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::Ready)));
    let provider = MpcWalletProvider::mount(auth.clone());
    let mut handle = provider.subscribe();

    provider.trigger_login().await.unwrap();
    provider.logout().await.unwrap();
    assert_eq!(handle.current().wallet_state, MpcWalletState::NotInitialized);
    assert_eq!(handle.current().user_info.email, None);

    provider.trigger_login().await.unwrap();
    provider.reset_account().await.unwrap();
    assert_eq!(auth.resets.load(Ordering::SeqCst), 1);
    assert_eq!(
        handle.changed().await.unwrap().wallet_state,
        MpcWalletState::NotInitialized
    );
}

#[tokio::test]
async fn test_handle_errors_after_unmount() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::Ready)));
    let provider = MpcWalletProvider::mount(auth);
    let mut handle = provider.subscribe();

    drop(provider);

    // Teardown on drop is the last value observed
    let last = handle.changed().await.unwrap();
    assert_eq!(last.wallet_state, MpcWalletState::NotInitialized);
    assert!(handle.changed().await.is_err());
}

#[tokio::test]
async fn test_sync_picks_up_out_of_band_state() {
    let auth = Arc::new(MockAuth::new(Ok(MpcWalletState::Ready)));
    let provider = MpcWalletProvider::mount(auth.clone());

    *auth.remote_state.lock().unwrap() = MpcWalletState::ManualRecovery;
    assert_eq!(
        provider.sync_wallet_state().await.unwrap(),
        MpcWalletState::ManualRecovery
    );
    let context = provider.context();
    assert_eq!(context.wallet_state, MpcWalletState::ManualRecovery);
    assert_eq!(context.user_info.email.as_deref(), Some("owner@example.com"));

    *auth.remote_state.lock().unwrap() = MpcWalletState::NotInitialized;
    provider.sync_wallet_state().await.unwrap();
    assert_eq!(provider.context(), MpcWalletContext::default());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_start_once() {
    let mut auth = MockAuth::new(Ok(MpcWalletState::Ready));
    auth.login_delay = Duration::from_millis(50);
    let auth = Arc::new(auth);
    let provider = Arc::new(MpcWalletProvider::mount(auth.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.trigger_login().await })
        })
        .collect();
    let results = futures::future::join_all(tasks).await;

    assert_eq!(auth.logins.load(Ordering::SeqCst), 1, "Only one login reaches the provider");
    let states: Vec<MpcWalletState> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    assert_eq!(
        states
            .iter()
            .filter(|s| **s == MpcWalletState::Ready)
            .count(),
        1
    );
    assert!(states
        .iter()
        .all(|s| matches!(s, MpcWalletState::Ready | MpcWalletState::Authenticating)));
    assert_eq!(provider.context().wallet_state, MpcWalletState::Ready);
}
