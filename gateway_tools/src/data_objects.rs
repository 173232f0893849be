use serde::{Deserialize, Serialize};

//--------------------------------------  Status API records   -------------------------------------------------------
/// The transaction record returned by `GET /v2/{order_id}/status`. Unknown fields are preserved by the client
/// as a raw JSON value alongside this parsed view.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStatusRecord {
    pub order_id: String,
    pub status_code: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
}

//--------------------------------------   Snap API records    -------------------------------------------------------
/// Request body for `POST /snap/v1/transactions`. Amounts are in whole currency units, and the sum of
/// `price * quantity` over `item_details` must equal `gross_amount` or the gateway rejects the request.
#[derive(Debug, Clone, Serialize)]
pub struct SnapTransactionRequest {
    pub transaction_details: SnapTransactionDetails,
    pub item_details: Vec<SnapItem>,
    pub customer_details: SnapCustomerDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<SnapCallbacks>,
    pub expiry: SnapExpiry,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapTransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapItem {
    pub id: String,
    pub price: i64,
    pub quantity: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapCustomerDetails {
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapCallbacks {
    pub finish: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapExpiry {
    pub unit: String,
    pub duration: i64,
}

impl SnapExpiry {
    pub fn hours(duration: i64) -> Self {
        Self { unit: "hours".to_string(), duration }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapTransactionResponse {
    pub token: String,
    pub redirect_url: String,
}
