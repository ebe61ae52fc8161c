//! Counterfactual Safes: predicted addresses that are deployed together with
//! their first executed transaction.

pub mod form;
pub mod store;

pub use form::{
    ExecuteAndDeployProps, ExecuteAndDeploySafeForm, FormNotice, FormServices, SignerAccess,
    SubmissionState, SubmitBlocker, SubmitOutcome, EXECUTE_LABEL, EXECUTING_LABEL,
    SUBMIT_ERROR_MESSAGE,
};
pub use store::{FileRegistry, MemoryRegistry, UndeployedSafe, UndeployedSafeRegistry};
