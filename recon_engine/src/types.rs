//! Canonical data model for the reconciliation engine.
//!
//! External API responses (CMS resources, gateway payloads) are normalised into these types at the client
//! boundary. Nothing downstream of the clients should ever have to guess at response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spr_common::Money;

use crate::status::OrderStatus;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The external order identifier, generated client-side at checkout time. Globally unique and immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl std::str::FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      DocumentId       -------------------------------------------------------
/// The opaque identifier the CMS assigns to a record. All mutation calls are keyed on this, never on the
/// external order id or a numeric row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      CustomerRef      -------------------------------------------------------
/// A weak reference to the purchasing account. Lookup only; the reconciler never mutates user records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRef {
    /// The account id, when the order carries a direct relation.
    pub id: Option<i64>,
    /// Fallback for resolving the account when the relation is missing.
    pub email: Option<String>,
}

//--------------------------------------       LineItem        -------------------------------------------------------
/// One line of an order. Shipping lines are synthetic and excluded from stock and cart side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// The product's CMS document id, as captured at checkout time.
    pub product_ref: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub category: String,
}

pub const SHIPPING_CATEGORY: &str = "shipping";

impl LineItem {
    pub fn is_shipping(&self) -> bool {
        self.category == SHIPPING_CATEGORY
    }
}

//--------------------------------------         Order         -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Order {
    pub internal_id: DocumentId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub items: Vec<LineItem>,
    pub customer: CustomerRef,
    pub gateway_transaction_id: Option<String>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A checkout-time order payload. Orders are always created in the pending state.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub total_amount: Money,
    pub items: Vec<LineItem>,
    /// The purchasing account's id, when the storefront session supplied one.
    pub customer_id: Option<i64>,
    pub customer: CustomerDetails,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      OrderUpdate      -------------------------------------------------------
/// The partial field set written back to the order store on reconciliation. Applying the same update twice
/// produces the same stored state.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub gateway_transaction_id: Option<String>,
    /// The verified gateway response plus the raw notification and a reconciliation timestamp. Overwritten on
    /// every reconciliation, never merged.
    pub payment_metadata: Value,
}

//--------------------------------------        Product        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Product {
    pub internal_id: DocumentId,
    pub product_ref: String,
    pub name: String,
    pub stock: i64,
}

//--------------------------------------        CartLine       -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct CartLine {
    pub internal_id: DocumentId,
    pub quantity: i64,
}

//--------------------------------------  IncomingNotification -------------------------------------------------------
/// A webhook notification after synchronous validation, queued for background reconciliation. Only the order id
/// is acted on; the raw body is retained for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingNotification {
    pub order_id: OrderId,
    pub transaction_id: Option<String>,
    pub raw: Value,
}

//-------------------------------------- VerifiedTransaction   -------------------------------------------------------
/// The authoritative transaction state, as returned by the gateway's server-to-server status query. This, not
/// the webhook body, drives all financial decisions.
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    pub order_id: OrderId,
    pub transaction_status: String,
    pub fraud_status: Option<String>,
    pub transaction_id: Option<String>,
    pub status_code: String,
    pub payment_type: Option<String>,
    pub gross_amount: Option<String>,
    /// The full response body, stored in the order's payment metadata.
    pub raw: Value,
}

//--------------------------------------    NewTransaction     -------------------------------------------------------
/// A request for a new hosted-payment session at the gateway.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub order_id: OrderId,
    pub gross_amount: Money,
    pub items: Vec<LineItem>,
    pub customer: CustomerDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub billing_address: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

impl CustomerDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

//--------------------------------------    PaymentSession     -------------------------------------------------------
/// The gateway's handle on a newly created hosted-payment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSession {
    pub token: String,
    pub redirect_url: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shipping_lines_are_flagged() {
        let item = LineItem {
            product_ref: "doc-1".into(),
            name: "Standard delivery".into(),
            unit_price: Money::from_cents(1_500_000),
            quantity: 1,
            category: SHIPPING_CATEGORY.into(),
        };
        assert!(item.is_shipping());
        let item = LineItem { category: "groceries".into(), ..item };
        assert!(!item.is_shipping());
    }

    #[test]
    fn customer_details_full_name_trims_missing_last_name() {
        let details = CustomerDetails {
            first_name: "Ayu".into(),
            last_name: String::new(),
            email: "ayu@example.com".into(),
            phone: None,
            billing_address: None,
            shipping_address: None,
        };
        assert_eq!(details.full_name(), "Ayu");
    }
}
