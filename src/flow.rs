use std::sync::atomic::{AtomicBool, Ordering};

/// Container hosting the active transaction flow (the tx modal)
pub trait TxFlowContainer: Send + Sync {
    /// Unmount the active flow
    fn dismiss(&self);
}

/// Flow container that only remembers whether it was dismissed
#[derive(Debug, Default)]
pub struct TxFlowHandle {
    dismissed: AtomicBool,
}

impl TxFlowHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }
}

impl TxFlowContainer for TxFlowHandle {
    fn dismiss(&self) {
        self.dismissed.store(true, Ordering::SeqCst);
    }
}
