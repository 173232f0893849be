use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};
use serde_json::Value;

use crate::{
    config::GatewayConfig,
    data_objects::{SnapTransactionRequest, SnapTransactionResponse, TransactionStatusRecord},
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn server_key(&self) -> &str {
        self.config.server_key.reveal()
    }

    /// Queries the authoritative status of a transaction. The returned raw body is kept verbatim for the
    /// order's payment metadata.
    ///
    /// The gateway reports "no such transaction" two ways: an HTTP 404, or a 200 whose body carries
    /// `status_code: "404"`. Both map to [`GatewayApiError::TransactionNotFound`].
    pub async fn fetch_transaction_status(
        &self,
        order_id: &str,
    ) -> Result<(TransactionStatusRecord, Value), GatewayApiError> {
        let url = format!("{}/v2/{order_id}/status", self.config.api_url);
        trace!("Fetching transaction status: {url}");
        let response = self
            .client
            .get(url)
            .basic_auth(self.config.server_key.reveal(), Some(""))
            .send()
            .await
            .map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayApiError::TransactionNotFound(order_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            return Err(GatewayApiError::QueryError { status, message });
        }
        let raw = response.json::<Value>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))?;
        if raw.get("status_code").and_then(Value::as_str) == Some("404") {
            return Err(GatewayApiError::TransactionNotFound(order_id.to_string()));
        }
        let record =
            serde_json::from_value::<TransactionStatusRecord>(raw.clone()).map_err(|e| GatewayApiError::JsonError(e.to_string()))?;
        debug!(
            "Transaction {} is '{}' (fraud: {})",
            record.order_id,
            record.transaction_status,
            record.fraud_status.as_deref().unwrap_or("n/a")
        );
        Ok((record, raw))
    }

    /// Opens a hosted-payment session for a new order.
    pub async fn create_transaction(
        &self,
        request: SnapTransactionRequest,
    ) -> Result<SnapTransactionResponse, GatewayApiError> {
        let url = format!("{}/snap/v1/transactions", self.config.snap_url);
        trace!("Creating payment session: {url}");
        let response = self
            .client
            .post(url)
            .basic_auth(self.config.server_key.reveal(), Some(""))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            return Err(GatewayApiError::QueryError { status, message });
        }
        let session =
            response.json::<SnapTransactionResponse>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))?;
        info!("Payment session created for order {}", request.transaction_details.order_id);
        Ok(session)
    }
}
