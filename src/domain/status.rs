//! Transaction status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a transaction as driven by payment initiation and
/// provider callbacks.
///
/// `Pending` is the only re-enterable state; a callback may re-affirm it.
/// `Success`, `Error` and `Cancelled` are terminal for this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Error,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Error => "error",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Whether a transaction currently in `current` may be saved as `next`.
    ///
    /// A transaction with no status yet may only enter `Pending`. From
    /// `Pending` every status is reachable, including `Pending` itself.
    /// A terminal status may only be re-asserted, never replaced.
    pub fn can_become(current: Option<TransactionStatus>, next: TransactionStatus) -> bool {
        match current {
            None => next == TransactionStatus::Pending,
            Some(TransactionStatus::Pending) => true,
            Some(terminal) => terminal == next,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_not_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Success.is_terminal());
        assert!(TransactionStatus::Error.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_unstarted_transaction_may_only_enter_pending() {
        assert!(TransactionStatus::can_become(None, TransactionStatus::Pending));
        assert!(!TransactionStatus::can_become(None, TransactionStatus::Success));
        assert!(!TransactionStatus::can_become(None, TransactionStatus::Error));
        assert!(!TransactionStatus::can_become(None, TransactionStatus::Cancelled));
    }

    #[test]
    fn test_pending_reaches_every_status() {
        let from = Some(TransactionStatus::Pending);
        assert!(TransactionStatus::can_become(from, TransactionStatus::Pending));
        assert!(TransactionStatus::can_become(from, TransactionStatus::Success));
        assert!(TransactionStatus::can_become(from, TransactionStatus::Error));
        assert!(TransactionStatus::can_become(from, TransactionStatus::Cancelled));
    }

    #[test]
    fn test_terminal_status_never_regresses() {
        for terminal in [
            TransactionStatus::Success,
            TransactionStatus::Error,
            TransactionStatus::Cancelled,
        ] {
            assert!(!TransactionStatus::can_become(
                Some(terminal),
                TransactionStatus::Pending
            ));
            assert!(TransactionStatus::can_become(Some(terminal), terminal));
        }
        assert!(!TransactionStatus::can_become(
            Some(TransactionStatus::Success),
            TransactionStatus::Cancelled
        ));
    }

    #[test]
    fn test_status_string_forms() {
        assert_eq!(TransactionStatus::Pending.to_string(), "pending");
        assert_eq!(TransactionStatus::Cancelled.as_str(), "cancelled");
    }
}
