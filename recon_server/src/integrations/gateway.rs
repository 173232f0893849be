//! Gateway-backed implementation of the engine's [`PaymentGateway`] trait.

use gateway_tools::{
    GatewayApi,
    GatewayApiError,
    SnapCallbacks,
    SnapCustomerDetails,
    SnapExpiry,
    SnapItem,
    SnapTransactionDetails,
    SnapTransactionRequest,
};
use recon_engine::{
    traits::{GatewayError, PaymentGateway},
    types::{NewTransaction, OrderId, PaymentSession, VerifiedTransaction},
};

const SESSION_EXPIRY_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SnapGateway {
    api: GatewayApi,
    /// Where the gateway sends the customer's browser after payment.
    finish_url: String,
}

impl SnapGateway {
    pub fn new(api: GatewayApi, storefront_url: &str) -> Self {
        Self { api, finish_url: format!("{storefront_url}/order/finish") }
    }
}

impl PaymentGateway for SnapGateway {
    async fn fetch_transaction_status(&self, order_id: &OrderId) -> Result<VerifiedTransaction, GatewayError> {
        let (record, raw) = self.api.fetch_transaction_status(order_id.as_str()).await.map_err(gateway_error)?;
        Ok(VerifiedTransaction {
            order_id: record.order_id.into(),
            transaction_status: record.transaction_status,
            fraud_status: record.fraud_status,
            transaction_id: record.transaction_id,
            status_code: record.status_code,
            payment_type: record.payment_type,
            gross_amount: record.gross_amount,
            raw,
        })
    }

    async fn create_transaction(&self, request: &NewTransaction) -> Result<PaymentSession, GatewayError> {
        let snap_request = SnapTransactionRequest {
            transaction_details: SnapTransactionDetails {
                order_id: request.order_id.0.clone(),
                gross_amount: request.gross_amount.whole_units(),
            },
            item_details: request
                .items
                .iter()
                .map(|i| SnapItem {
                    id: i.product_ref.clone(),
                    price: i.unit_price.whole_units(),
                    quantity: i.quantity,
                    name: i.name.clone(),
                })
                .collect(),
            customer_details: SnapCustomerDetails {
                first_name: request.customer.first_name.clone(),
                last_name: request.customer.last_name.clone(),
                email: request.customer.email.clone(),
                phone: request.customer.phone.clone(),
            },
            callbacks: Some(SnapCallbacks { finish: self.finish_url.clone() }),
            expiry: SnapExpiry::hours(SESSION_EXPIRY_HOURS),
        };
        let session = self.api.create_transaction(snap_request).await.map_err(gateway_error)?;
        Ok(PaymentSession { token: session.token, redirect_url: session.redirect_url })
    }
}

fn gateway_error(e: GatewayApiError) -> GatewayError {
    match e {
        GatewayApiError::TransactionNotFound(id) => GatewayError::TransactionNotFound(id),
        GatewayApiError::QueryError { status, message } => GatewayError::Api { status, message },
        GatewayApiError::JsonError(m) => GatewayError::Malformed(m),
        GatewayApiError::Initialization(m) | GatewayApiError::RestResponseError(m) => GatewayError::Network(m),
    }
}
