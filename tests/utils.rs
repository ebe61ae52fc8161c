#[cfg(test)]
#[allow(dead_code)]
pub mod test_utils {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use safe_console_sdk::{
        affordability::BalanceOracle,
        counterfactual::{
            ExecuteAndDeployProps, ExecuteAndDeploySafeForm, FormServices, MemoryRegistry,
            SignerAccess, UndeployedSafe, UndeployedSafeRegistry,
        },
        flow::TxFlowContainer,
        mpc::{MpcAuthProvider, MpcWalletState, UserInfo},
        recovery::{RecoveryEmailService, SignerEmail},
        sdk::{GasPriceOracle, SafeSdk, SafeSdkFactory, TxActions},
        telemetry::{ErrorCode, ErrorTracker, TrackedError},
        Address, Bytes, ChainFeature, ChainInfo, Error, GasPrice, SafeTransaction, SafeTxData,
        TxOptions, TxSecurity, B256, U256,
    };

    pub const SEPOLIA: u64 = 11155111;

    /// Point chain loading at the repository's `config/` directory
    pub fn init_test_env() {
        std::env::set_var(
            safe_console_sdk::config::CONFIG_DIR_ENV,
            concat!(env!("CARGO_MANIFEST_DIR"), "/config"),
        );
    }

    /// One wei-denominated ether
    pub fn ether() -> U256 {
        U256::from(1_000_000_000_000_000_000u128)
    }

    pub fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000u64)
    }

    pub fn sepolia() -> ChainInfo {
        ChainInfo::new(SEPOLIA, "Sepolia", "http://localhost:8545")
            .with_feature(ChainFeature::Eip1559)
            .with_feature(ChainFeature::Counterfactual)
    }

    pub fn safe_address() -> Address {
        Address::repeat_byte(0x5a)
    }

    pub fn owner() -> Address {
        Address::repeat_byte(0x01)
    }

    pub fn sample_tx() -> SafeTransaction {
        SafeTransaction::new(SafeTxData::call(
            Address::repeat_byte(0x02),
            U256::from(1_000u64),
            Bytes::new(),
            0,
        ))
    }

    pub fn undeployed_safe() -> UndeployedSafe {
        UndeployedSafe {
            owners: vec![owner()],
            threshold: 1,
            salt_nonce: "0".to_string(),
            safe_version: "1.4.1".to_string(),
            fallback_handler: None,
        }
    }

    /// Shared log of side effects, in call order
    #[derive(Clone, Default)]
    pub struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        pub fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        pub fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    // =========================
    // Safe SDK
    // =========================

    pub struct MockSdk {
        pub base_gas: Result<u64, String>,
        pub safe_tx_gas: Result<u64, String>,
        pub deployment_gas: Result<u64, String>,
        pub calls: AtomicUsize,
        pub delay: Duration,
    }

    impl MockSdk {
        pub fn new(base_gas: u64, safe_tx_gas: u64, deployment_gas: u64) -> Self {
            Self {
                base_gas: Ok(base_gas),
                safe_tx_gas: Ok(safe_tx_gas),
                deployment_gas: Ok(deployment_gas),
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
            }
        }

        /// Each component call sleeps for `delay`
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        async fn answer(&self, value: &Result<u64, String>) -> Result<U256, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            value
                .as_ref()
                .map(|gas| U256::from(*gas))
                .map_err(|e| Error::Estimation(e.clone()))
        }
    }

    #[async_trait]
    impl SafeSdk for MockSdk {
        async fn estimate_tx_base_gas(&self, _tx: &SafeTransaction) -> Result<U256, Error> {
            self.answer(&self.base_gas).await
        }

        async fn estimate_safe_tx_gas(&self, _tx: &SafeTransaction) -> Result<U256, Error> {
            self.answer(&self.safe_tx_gas).await
        }

        async fn estimate_safe_deployment_gas(&self) -> Result<U256, Error> {
            self.answer(&self.deployment_gas).await
        }
    }

    pub struct MockSdkFactory {
        pub sdk: Arc<MockSdk>,
    }

    #[async_trait]
    impl SafeSdkFactory for MockSdkFactory {
        async fn sdk_with_signer(&self, _chain_id: u64) -> Result<Arc<dyn SafeSdk>, Error> {
            Ok(self.sdk.clone())
        }
    }

    /// Factory of a wallet that has no signer connected yet
    pub struct NotReadyFactory;

    #[async_trait]
    impl SafeSdkFactory for NotReadyFactory {
        async fn sdk_with_signer(&self, _chain_id: u64) -> Result<Arc<dyn SafeSdk>, Error> {
            Err(Error::NotReady("no signer".to_string()))
        }
    }

    pub struct FixedGasPrice(pub GasPrice);

    #[async_trait]
    impl GasPriceOracle for FixedGasPrice {
        async fn gas_price(&self) -> Result<GasPrice, Error> {
            Ok(self.0)
        }
    }

    pub struct FixedBalance(pub Option<U256>);

    #[async_trait]
    impl BalanceOracle for FixedBalance {
        async fn wallet_balance(&self) -> Result<Option<U256>, Error> {
            Ok(self.0)
        }
    }

    // =========================
    // Wallet transaction actions
    // =========================

    #[derive(Debug, Clone)]
    pub enum ActionResult {
        Succeed,
        Reject,
        Fail(String),
    }

    pub struct MockTxActions {
        results: Mutex<VecDeque<ActionResult>>,
        pub calls: AtomicUsize,
        pub last_options: Mutex<Option<TxOptions>>,
        pub delay: Duration,
        pub log: CallLog,
    }

    impl MockTxActions {
        /// Answers with `results` in order, succeeding once they run out
        pub fn new(results: Vec<ActionResult>, log: CallLog) -> Self {
            Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
                last_options: Mutex::new(None),
                delay: Duration::from_millis(0),
                log,
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TxActions for MockTxActions {
        async fn deploy_safe_and_execute_tx(
            &self,
            options: TxOptions,
            _tx: &SafeTransaction,
        ) -> Result<B256, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock().unwrap() = Some(options);
            self.log.push("deploy");

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let result = self
                .results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ActionResult::Succeed);
            match result {
                ActionResult::Succeed => Ok(B256::repeat_byte(0xab)),
                ActionResult::Reject => Err(Error::from_provider(Some(4001), "User rejected the request")),
                ActionResult::Fail(message) => Err(Error::from_provider(Some(-32000), message)),
            }
        }
    }

    // =========================
    // Registry, flow container, tracker
    // =========================

    pub struct LoggingRegistry {
        pub inner: MemoryRegistry,
        pub log: CallLog,
    }

    impl UndeployedSafeRegistry for LoggingRegistry {
        fn add(&self, chain_id: u64, address: Address, safe: UndeployedSafe) -> Result<(), Error> {
            self.inner.add(chain_id, address, safe)
        }

        fn get(&self, chain_id: u64, address: Address) -> Result<Option<UndeployedSafe>, Error> {
            self.inner.get(chain_id, address)
        }

        fn remove(&self, chain_id: u64, address: Address) -> Result<bool, Error> {
            self.log.push(format!("remove {}:{}", chain_id, address));
            self.inner.remove(chain_id, address)
        }

        fn list(&self, chain_id: Option<u64>) -> Result<Vec<(u64, Address, UndeployedSafe)>, Error> {
            self.inner.list(chain_id)
        }
    }

    pub struct LoggingFlow {
        pub log: CallLog,
    }

    impl TxFlowContainer for LoggingFlow {
        fn dismiss(&self) {
            self.log.push("dismiss");
        }
    }

    #[derive(Default)]
    pub struct RecordingTracker {
        pub events: Mutex<Vec<TrackedError>>,
    }

    impl RecordingTracker {
        pub fn events(&self) -> Vec<TrackedError> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ErrorTracker for RecordingTracker {
        fn track_error(&self, code: ErrorCode, err: &Error) -> TrackedError {
            let event = TrackedError::new(code, err);
            self.events.lock().unwrap().push(event.clone());
            event
        }
    }

    /// Form wired to test doubles, with handles to inspect them
    pub struct FormHarness {
        pub form: ExecuteAndDeploySafeForm,
        pub actions: Arc<MockTxActions>,
        pub registry: Arc<LoggingRegistry>,
        pub tracker: Arc<RecordingTracker>,
        pub log: CallLog,
    }

    pub struct HarnessOptions {
        pub props: ExecuteAndDeployProps,
        pub access: SignerAccess,
        pub security: TxSecurity,
        pub results: Vec<ActionResult>,
        pub delay: Duration,
    }

    impl Default for HarnessOptions {
        fn default() -> Self {
            Self {
                props: ExecuteAndDeployProps {
                    safe_tx: Some(sample_tx()),
                    ..Default::default()
                },
                access: SignerAccess {
                    is_owner: true,
                    is_execution_loop: false,
                },
                security: TxSecurity::default(),
                results: Vec::new(),
                delay: Duration::from_millis(0),
            }
        }
    }

    pub fn create_form(options: HarnessOptions) -> FormHarness {
        let log = CallLog::default();
        let actions = Arc::new(MockTxActions::new(options.results, log.clone()).with_delay(options.delay));

        let registry = Arc::new(LoggingRegistry {
            inner: MemoryRegistry::new(),
            log: log.clone(),
        });
        registry
            .add(SEPOLIA, safe_address(), undeployed_safe())
            .expect("seed registry");
        registry
            .add(SEPOLIA, Address::repeat_byte(0x77), undeployed_safe())
            .expect("seed registry");
        registry
            .add(1, safe_address(), undeployed_safe())
            .expect("seed registry");

        let tracker = Arc::new(RecordingTracker::default());

        let services = FormServices {
            tx_actions: actions.clone(),
            registry: registry.clone(),
            tx_flow: Arc::new(LoggingFlow { log: log.clone() }),
            error_tracker: tracker.clone(),
        };

        let form = ExecuteAndDeploySafeForm::new(
            sepolia(),
            safe_address(),
            options.props,
            options.access,
            options.security,
            services,
        );

        FormHarness {
            form,
            actions,
            registry,
            tracker,
            log,
        }
    }

    // =========================
    // MPC auth provider
    // =========================

    pub struct MockAuth {
        pub login_result: Mutex<Result<MpcWalletState, String>>,
        pub remote_state: Mutex<MpcWalletState>,
        pub logins: AtomicUsize,
        pub login_delay: Duration,
        pub email: Option<String>,
        pub recovered: AtomicUsize,
        pub backups: Mutex<Vec<String>>,
        pub resets: AtomicUsize,
    }

    impl MockAuth {
        pub fn new(login_result: Result<MpcWalletState, String>) -> Self {
            Self {
                login_result: Mutex::new(login_result),
                remote_state: Mutex::new(MpcWalletState::NotInitialized),
                logins: AtomicUsize::new(0),
                login_delay: Duration::from_millis(0),
                email: Some("owner@example.com".to_string()),
                recovered: AtomicUsize::new(0),
                backups: Mutex::new(Vec::new()),
                resets: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MpcAuthProvider for MockAuth {
        async fn login(&self) -> Result<MpcWalletState, Error> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if !self.login_delay.is_zero() {
                tokio::time::sleep(self.login_delay).await;
            }
            self.login_result.lock().unwrap().clone().map_err(Error::Auth)
        }

        async fn logout(&self) -> Result<(), Error> {
            Ok(())
        }

        async fn reset_account(&self) -> Result<(), Error> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn upsert_password_backup(&self, password: &str) -> Result<(), Error> {
            self.backups.lock().unwrap().push(password.to_string());
            Ok(())
        }

        async fn recover_factor_with_password(&self, password: &str) -> Result<(), Error> {
            if password == "correct horse battery staple" {
                self.recovered.fetch_add(1, Ordering::SeqCst);
                Ok(())
            } else {
                Err(Error::Auth("Invalid password".to_string()))
            }
        }

        async fn wallet_state(&self) -> Result<MpcWalletState, Error> {
            Ok(*self.remote_state.lock().unwrap())
        }

        async fn user_info(&self) -> Result<UserInfo, Error> {
            Ok(UserInfo {
                email: self.email.clone(),
            })
        }
    }

    // =========================
    // Recovery email service
    // =========================

    #[derive(Debug, Clone)]
    pub enum EmailLookup {
        Found(SignerEmail),
        Missing,
        Reject,
        NotFoundError,
    }

    pub struct MockEmailService {
        pub lookup: EmailLookup,
        pub register_result: Result<(), i64>,
        pub registered: Mutex<Vec<String>>,
    }

    impl MockEmailService {
        pub fn new(lookup: EmailLookup) -> Self {
            Self {
                lookup,
                register_result: Ok(()),
                registered: Mutex::new(Vec::new()),
            }
        }

        pub fn registered(&self) -> Vec<String> {
            self.registered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecoveryEmailService for MockEmailService {
        async fn get_signer_email_address(&self) -> Result<Option<SignerEmail>, Error> {
            match &self.lookup {
                EmailLookup::Found(email) => Ok(Some(email.clone())),
                EmailLookup::Missing => Ok(None),
                EmailLookup::Reject => Err(Error::from_provider(Some(4001), "User rejected")),
                EmailLookup::NotFoundError => Err(Error::RecoveryEmail(
                    "Unexpected end of JSON input".to_string(),
                )),
            }
        }

        async fn register_email_address(&self, email: &str) -> Result<(), Error> {
            match self.register_result {
                Ok(()) => {
                    self.registered.lock().unwrap().push(email.to_string());
                    Ok(())
                }
                Err(code) => Err(Error::from_provider(Some(code), "register failed")),
            }
        }
    }
}
