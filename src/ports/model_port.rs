//! Language model port trait.

use crate::domain::error::FundchatError;

/// A text-completion model. Implementations block until the reply is complete.
pub trait ModelPort: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, FundchatError>;

    /// Reachability check run before each turn.
    fn check_available(&self) -> Result<(), FundchatError>;

    fn is_available(&self) -> bool {
        self.check_available().is_ok()
    }
}
