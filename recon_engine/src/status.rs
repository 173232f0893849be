//! Canonical order lifecycle states and the gateway status mapping.
//!
//! The gateway reports a transaction status and, for card payments, a fraud status. [`map_status`] collapses the
//! pair into the single canonical [`OrderStatus`] that drives the order lifecycle. The mapping is deliberately
//! conservative: anything unrecognised maps to [`OrderStatus::Pending`] rather than to a success state.

use std::{fmt::Display, str::FromStr};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct StatusConversionError(pub String);

//--------------------------------------   TransactionStatus   -------------------------------------------------------
/// The transaction status as reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Authorize,
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
}

impl FromStr for TransactionStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorize" => Ok(Self::Authorize),
            "capture" => Ok(Self::Capture),
            "settlement" => Ok(Self::Settlement),
            "pending" => Ok(Self::Pending),
            "deny" => Ok(Self::Deny),
            "cancel" => Ok(Self::Cancel),
            "expire" => Ok(Self::Expire),
            "failure" => Ok(Self::Failure),
            "refund" => Ok(Self::Refund),
            "partial_refund" => Ok(Self::PartialRefund),
            "chargeback" => Ok(Self::Chargeback),
            "partial_chargeback" => Ok(Self::PartialChargeback),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      FraudStatus      -------------------------------------------------------
/// The fraud-review verdict attached to `capture` transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudStatus {
    Accept,
    Challenge,
    Deny,
}

impl FromStr for FraudStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Self::Accept),
            "challenge" => Ok(Self::Challenge),
            "deny" => Ok(Self::Deny),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------
/// The canonical order lifecycle state. Only the reconciler writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// The order has been created and no settled payment has been verified yet.
    Pending,
    /// The payment has been authorized but not captured.
    Authorize,
    /// The payment was captured but is awaiting fraud review.
    Capture,
    /// The payment settled. Terminal success state; settlement side effects run on the transition into it.
    Settlement,
    /// The payment was denied by the gateway or the fraud check.
    Deny,
    /// The transaction was cancelled.
    Cancel,
    /// The payment window lapsed without payment.
    Expire,
    /// The payment was refunded, partially or in full.
    Refund,
    /// The payment was charged back, partially or in full.
    Chargeback,
    /// The gateway reported an unexpected failure.
    Failure,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Authorize => "authorize",
            OrderStatus::Capture => "capture",
            OrderStatus::Settlement => "settlement",
            OrderStatus::Deny => "deny",
            OrderStatus::Cancel => "cancel",
            OrderStatus::Expire => "expire",
            OrderStatus::Refund => "refund",
            OrderStatus::Chargeback => "chargeback",
            OrderStatus::Failure => "failure",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "authorize" => Ok(Self::Authorize),
            "capture" => Ok(Self::Capture),
            "settlement" => Ok(Self::Settlement),
            "deny" => Ok(Self::Deny),
            "cancel" => Ok(Self::Cancel),
            "expire" => Ok(Self::Expire),
            "refund" => Ok(Self::Refund),
            "chargeback" => Ok(Self::Chargeback),
            "failure" => Ok(Self::Failure),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("⚖️️ Invalid order status stored in backend: {value}. Defaulting to pending.");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------      map_status       -------------------------------------------------------
/// Maps a verified gateway `(transaction_status, fraud_status)` pair into the canonical order status.
///
/// Inputs are the raw strings from the gateway's status query so that an unrecognised value can take the fail-safe
/// path instead of being rejected upstream. An unknown transaction status maps to `pending` and is logged; it must
/// never be treated as a success.
pub fn map_status(transaction_status: &str, fraud_status: Option<&str>) -> OrderStatus {
    let tx = match transaction_status.parse::<TransactionStatus>() {
        Ok(tx) => tx,
        Err(_) => {
            warn!("⚖️️ Unrecognised gateway transaction status '{transaction_status}'. Treating the order as pending.");
            return OrderStatus::Pending;
        },
    };
    let fraud = fraud_status.map(|f| {
        f.parse::<FraudStatus>().unwrap_or_else(|_| {
            warn!("⚖️️ Unrecognised gateway fraud status '{f}'. Treating it as a challenge.");
            FraudStatus::Challenge
        })
    });
    match (tx, fraud) {
        (TransactionStatus::Capture, Some(FraudStatus::Accept)) => OrderStatus::Settlement,
        (TransactionStatus::Capture, Some(FraudStatus::Deny)) => OrderStatus::Deny,
        (TransactionStatus::Capture, _) => OrderStatus::Capture,
        (TransactionStatus::Settlement, _) => OrderStatus::Settlement,
        (TransactionStatus::Pending, _) => OrderStatus::Pending,
        (TransactionStatus::Deny, _) => OrderStatus::Deny,
        (TransactionStatus::Cancel, _) => OrderStatus::Cancel,
        (TransactionStatus::Expire, _) => OrderStatus::Expire,
        (TransactionStatus::Failure, _) => OrderStatus::Failure,
        (TransactionStatus::Refund | TransactionStatus::PartialRefund, _) => OrderStatus::Refund,
        (TransactionStatus::Chargeback | TransactionStatus::PartialChargeback, _) => OrderStatus::Chargeback,
        (TransactionStatus::Authorize, _) => OrderStatus::Authorize,
    }
}

impl OrderStatus {
    /// True for states from which the order will never change again (barring manual intervention).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending | OrderStatus::Authorize | OrderStatus::Capture)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn capture_with_accepted_fraud_check_settles() {
        assert_eq!(map_status("capture", Some("accept")), OrderStatus::Settlement);
    }

    #[test]
    fn capture_awaiting_fraud_review_stays_captured() {
        assert_eq!(map_status("capture", Some("challenge")), OrderStatus::Capture);
        assert_eq!(map_status("capture", None), OrderStatus::Capture);
        assert_eq!(map_status("capture", Some("garbage")), OrderStatus::Capture);
    }

    #[test]
    fn capture_with_denied_fraud_check_is_denied() {
        assert_eq!(map_status("capture", Some("deny")), OrderStatus::Deny);
    }

    #[test]
    fn pass_through_statuses() {
        assert_eq!(map_status("settlement", None), OrderStatus::Settlement);
        assert_eq!(map_status("settlement", Some("accept")), OrderStatus::Settlement);
        assert_eq!(map_status("pending", None), OrderStatus::Pending);
        assert_eq!(map_status("deny", None), OrderStatus::Deny);
        assert_eq!(map_status("cancel", None), OrderStatus::Cancel);
        assert_eq!(map_status("expire", None), OrderStatus::Expire);
        assert_eq!(map_status("failure", None), OrderStatus::Failure);
        assert_eq!(map_status("authorize", None), OrderStatus::Authorize);
    }

    #[test]
    fn refunds_and_chargebacks_collapse() {
        assert_eq!(map_status("refund", None), OrderStatus::Refund);
        assert_eq!(map_status("partial_refund", None), OrderStatus::Refund);
        assert_eq!(map_status("chargeback", None), OrderStatus::Chargeback);
        assert_eq!(map_status("partial_chargeback", None), OrderStatus::Chargeback);
    }

    #[test]
    fn unknown_status_fails_safe_to_pending() {
        assert_eq!(map_status("", None), OrderStatus::Pending);
        assert_eq!(map_status("paid", None), OrderStatus::Pending);
        assert_eq!(map_status("SETTLEMENT", Some("accept")), OrderStatus::Pending);
    }

    #[test]
    fn only_pre_settlement_states_are_non_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Authorize.is_terminal());
        assert!(!OrderStatus::Capture.is_terminal());
        assert!(OrderStatus::Settlement.is_terminal());
        assert!(OrderStatus::Expire.is_terminal());
        assert!(OrderStatus::Refund.is_terminal());
    }

    #[test]
    fn order_status_round_trips_through_strings() {
        for s in ["pending", "authorize", "capture", "settlement", "deny", "cancel", "expire", "refund", "chargeback", "failure"] {
            let status = s.parse::<OrderStatus>().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("Paid".parse::<OrderStatus>().is_err());
    }
}
