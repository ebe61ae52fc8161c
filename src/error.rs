use alloy_primitives::U256;
use thiserror::Error;

/// EIP-1193 code for a request the user declined in the wallet
pub const USER_REJECTED_REQUEST: i64 = 4001;
/// EIP-1193 code for a provider that is disconnected from all chains
pub const PROVIDER_DISCONNECTED: i64 = 4900;
/// EIP-1193 code for a provider that is not connected to the requested chain
pub const CHAIN_DISCONNECTED: i64 = 4901;

/// Case-insensitive marker of a declined action in provider messages,
/// including ethers' `ACTION_REJECTED`
const REJECTED: &str = "rejected";

/// Why the signer refused to sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The user closed or declined the wallet prompt
    Declined,
    /// The signer went away while the prompt was open
    Disconnected,
}

/// Error categories the console reacts to differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Silently absorbed, no error UI, no telemetry
    UserRejection,
    /// Advisory warning, never blocks submission on its own
    EstimationFailure,
    /// Blocks submission until funds are deposited
    AffordabilityFailure,
    /// Shown to the user, submission re-enabled, telemetry recorded
    ExecutionFailure,
    /// Blocks the affected sub-form only
    ValidationFailure,
    /// Everything else (configuration, IO, ...)
    Other,
}

/// SDK Error type
#[derive(Error, Debug)]
pub enum Error {
    /// The signer declined the request
    #[error("Wallet rejected the request ({0:?})")]
    WalletRejection(RejectionKind),

    /// Signer/provider error that is not a rejection
    #[error("Signer error: {message}")]
    Signer { code: Option<i64>, message: String },

    /// Gas estimation error
    #[error("Gas estimation error: {0}")]
    Estimation(String),

    /// Connected wallet cannot cover the fee
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: U256, available: U256 },

    /// Deploy and execute error
    #[error("Transaction execution error: {0}")]
    Execution(String),

    /// Input validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Signer or network context is not available yet
    #[error("Not ready: {0}")]
    NotReady(String),

    /// MPC authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Recovery email service error
    #[error("Recovery email error: {0}")]
    RecoveryEmail(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration loader error
    #[error("Configuration loader error: {0}")]
    ConfigLoader(#[from] config::ConfigError),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML write error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an error from a wallet provider response, classifying rejections
    pub fn from_provider(code: Option<i64>, message: impl Into<String>) -> Self {
        match code {
            Some(USER_REJECTED_REQUEST) => Error::WalletRejection(RejectionKind::Declined),
            Some(PROVIDER_DISCONNECTED) | Some(CHAIN_DISCONNECTED) => {
                Error::WalletRejection(RejectionKind::Disconnected)
            }
            _ => {
                let message = message.into();
                // Some wallets report a rejection with no code
                if message.to_lowercase().contains(REJECTED) {
                    Error::WalletRejection(RejectionKind::Declined)
                } else {
                    Error::Signer { code, message }
                }
            }
        }
    }

    /// Whether the signer refused the request
    pub fn is_wallet_rejection(&self) -> bool {
        matches!(self, Error::WalletRejection(_))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::WalletRejection(_) => ErrorKind::UserRejection,
            Error::Estimation(_) | Error::NotReady(_) => ErrorKind::EstimationFailure,
            Error::InsufficientFunds { .. } => ErrorKind::AffordabilityFailure,
            Error::Execution(_) | Error::Signer { .. } => ErrorKind::ExecutionFailure,
            Error::Validation(_) => ErrorKind::ValidationFailure,
            _ => ErrorKind::Other,
        }
    }
}
