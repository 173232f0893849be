use std::fmt::Display;

use chrono::Utc;
use recon_engine::types::{CustomerDetails, LineItem, NewOrder, Order, OrderId};
use serde::{Deserialize, Serialize};
use spr_common::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

//----------------------------------------------  Callback params  ----------------------------------------------------
/// Query parameters the gateway appends to the browser "finish" redirect. All optional; the handler only echoes
/// them onwards.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
    pub status_code: Option<String>,
}

//----------------------------------------------  Debug payloads  -----------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct DebugParams {
    pub order_id: Option<String>,
}

/// Operator view of a stored order, returned by the debug endpoint. Flattened to strings so it reads well in a
/// terminal.
#[derive(Debug, Clone, Serialize)]
pub struct DebugResponse {
    pub order_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
    pub signature_checks: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub status: String,
    pub total_amount: String,
    pub gateway_transaction_id: Option<String>,
}

impl DebugResponse {
    pub fn new(order: Option<Order>, signature_checks: bool) -> Self {
        let order = order.map(|o| OrderSummary {
            order_id: o.order_id.0,
            status: o.status.to_string(),
            total_amount: o.total_amount.to_decimal_string(),
            gateway_transaction_id: o.gateway_transaction_id,
        });
        Self { order_exists: order.is_some(), order, signature_checks }
    }
}

//----------------------------------------------  Checkout payloads  --------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: String,
    /// Total amount in whole currency units, matching the sum of the item lines.
    pub gross_amount: f64,
    pub items: Vec<CheckoutItem>,
    pub customer: CheckoutCustomer,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    /// The product's document id in the CMS.
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutCustomer {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub token: String,
    pub redirect_url: String,
}

pub fn new_order_from_checkout(request: CheckoutRequest) -> Result<NewOrder, String> {
    if request.order_id.trim().is_empty() {
        return Err("order_id must not be empty".to_string());
    }
    if request.items.is_empty() {
        return Err("order contains no items".to_string());
    }
    if request.customer.email.trim().is_empty() {
        return Err("customer email must not be empty".to_string());
    }
    let items = request
        .items
        .into_iter()
        .map(|i| LineItem {
            product_ref: i.id,
            name: i.name,
            unit_price: Money::from_units(i.price),
            quantity: i.quantity,
            category: i.category.unwrap_or_default(),
        })
        .collect();
    let customer = CustomerDetails {
        first_name: request.customer.first_name,
        last_name: request.customer.last_name,
        email: request.customer.email,
        phone: request.customer.phone,
        billing_address: None,
        shipping_address: request.shipping_address,
    };
    Ok(NewOrder {
        order_id: OrderId(request.order_id),
        total_amount: Money::from_units(request.gross_amount),
        items,
        customer_id: request.customer_id,
        customer,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            order_id: "ORDER-55".to_string(),
            gross_amount: 262_000.0,
            items: vec![CheckoutItem {
                id: "doc-rice".to_string(),
                name: "Rice 5kg".to_string(),
                price: 131_000.0,
                quantity: 2,
                category: Some("groceries".to_string()),
            }],
            customer: CheckoutCustomer {
                first_name: "Ayu".to_string(),
                last_name: "Lestari".to_string(),
                email: "ayu@example.com".to_string(),
                phone: None,
            },
            customer_id: Some(7),
            shipping_address: Some("Jl. Kebon Jeruk 12, Jakarta".to_string()),
        }
    }

    #[test]
    fn checkout_request_converts_to_a_new_order() {
        let order = new_order_from_checkout(request()).unwrap();
        assert_eq!(order.order_id.as_str(), "ORDER-55");
        assert_eq!(order.total_amount, Money::from_cents(26_200_000));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price, Money::from_cents(13_100_000));
        assert_eq!(order.customer_id, Some(7));
        assert_eq!(order.customer.full_name(), "Ayu Lestari");
    }

    #[test]
    fn empty_order_id_or_items_are_rejected() {
        let r = CheckoutRequest { order_id: "  ".to_string(), ..request() };
        assert!(new_order_from_checkout(r).is_err());
        let r = CheckoutRequest { items: vec![], ..request() };
        assert!(new_order_from_checkout(r).is_err());
    }
}
