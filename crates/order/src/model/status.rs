//! Order status state machine.
//!
//! Transitions are planned here and applied by the ledger as a
//! compare-and-set on the current status, so two racing writers can never
//! both succeed.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

pub const PAYMENT_FAILED_REASON: &str = "payment failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Statuses that grant download rights for the order's products.
    pub fn grants_entitlement(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Completed)
    }

    /// Money has been accepted by the gateway or settled out of band.
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            OrderStatus::Processing | OrderStatus::Paid | OrderStatus::Completed
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    GatewayAccepted,
    GatewayRejected,
    MarkPaid,
    AdminOverride {
        status: OrderStatus,
        cancel_reason: Option<String>,
    },
}

impl Transition {
    pub fn target(&self) -> OrderStatus {
        match self {
            Transition::GatewayAccepted => OrderStatus::Processing,
            Transition::GatewayRejected => OrderStatus::Canceled,
            Transition::MarkPaid => OrderStatus::Paid,
            Transition::AdminOverride { status, .. } => *status,
        }
    }

    /// Statuses the order must currently be in for the transition to apply.
    pub fn allowed_from(&self) -> Vec<OrderStatus> {
        match self {
            Transition::GatewayAccepted | Transition::GatewayRejected | Transition::MarkPaid => {
                vec![OrderStatus::Pending]
            }
            // an entitled order may only move to another entitled status
            Transition::AdminOverride { status, .. } if status.grants_entitlement() => vec![
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Paid,
            ],
            Transition::AdminOverride { .. } => {
                vec![OrderStatus::Pending, OrderStatus::Processing]
            }
        }
    }

    /// Reason persisted with the new status; only present for `Canceled`.
    pub fn cancel_reason(&self) -> Option<&str> {
        match self {
            Transition::GatewayRejected => Some(PAYMENT_FAILED_REASON),
            Transition::AdminOverride {
                status: OrderStatus::Canceled,
                cancel_reason,
            } => cancel_reason.as_deref().map(str::trim),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.target() == OrderStatus::Canceled
            && self.cancel_reason().is_none_or(str::is_empty)
        {
            return Err("cancel_reason is required when canceling an order".into());
        }
        Ok(())
    }

    pub fn permits(&self, current: OrderStatus) -> bool {
        self.allowed_from().contains(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_transitions_only_leave_pending() {
        for status in OrderStatus::ALL {
            assert_eq!(
                Transition::GatewayAccepted.permits(status),
                status == OrderStatus::Pending
            );
            assert_eq!(
                Transition::MarkPaid.permits(status),
                status == OrderStatus::Pending
            );
        }
        assert_eq!(Transition::GatewayAccepted.target(), OrderStatus::Processing);
        assert_eq!(Transition::GatewayRejected.target(), OrderStatus::Canceled);
    }

    #[test]
    fn rejected_payment_carries_reason() {
        let transition = Transition::GatewayRejected;
        assert_eq!(transition.cancel_reason(), Some(PAYMENT_FAILED_REASON));
        assert!(transition.validate().is_ok());
    }

    #[test]
    fn admin_cancel_requires_non_blank_reason() {
        for reason in [None, Some(String::new()), Some("   ".to_string())] {
            let transition = Transition::AdminOverride {
                status: OrderStatus::Canceled,
                cancel_reason: reason,
            };
            assert!(transition.validate().is_err());
        }

        let transition = Transition::AdminOverride {
            status: OrderStatus::Canceled,
            cancel_reason: Some(" buyer asked ".into()),
        };
        assert!(transition.validate().is_ok());
        assert_eq!(transition.cancel_reason(), Some("buyer asked"));
    }

    #[test]
    fn reason_is_dropped_for_non_cancel_targets() {
        let transition = Transition::AdminOverride {
            status: OrderStatus::Completed,
            cancel_reason: Some("ignored".into()),
        };
        assert_eq!(transition.cancel_reason(), None);
    }

    #[test]
    fn admin_override_never_revokes_entitlement() {
        let cancel = Transition::AdminOverride {
            status: OrderStatus::Canceled,
            cancel_reason: Some("fraud".into()),
        };
        assert!(!cancel.permits(OrderStatus::Paid));
        assert!(cancel.permits(OrderStatus::Processing));

        let complete = Transition::AdminOverride {
            status: OrderStatus::Completed,
            cancel_reason: None,
        };
        assert!(complete.permits(OrderStatus::Paid));
        assert!(!complete.permits(OrderStatus::Canceled));
        assert!(!complete.permits(OrderStatus::Completed));
    }

    #[test]
    fn status_names_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("Delivering".parse::<OrderStatus>().is_err());
    }
}
