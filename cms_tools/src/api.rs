use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{
    config::CmsConfig,
    data_objects::{CartRecord, Document, ItemResponse, ListResponse, NewOrderRecord, OrderRecord, OrderUpdateRecord, ProductRecord, UserRecord},
    CmsApiError,
};

#[derive(Clone)]
pub struct CmsApi {
    config: CmsConfig,
    client: Arc<Client>,
}

impl CmsApi {
    pub fn new(config: CmsConfig) -> Result<Self, CmsApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_token.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| CmsApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| CmsApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.config.base_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, CmsApiError> {
        let url = self.url(path);
        trace!("Sending CMS query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| CmsApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("CMS query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| CmsApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| CmsApiError::RestResponseError(e.to_string()))?;
            Err(CmsApiError::QueryError { status, message })
        }
    }

    /// Looks an order up by its external order id. The filter can match at most one record since the field is
    /// unique; extra matches would indicate a data problem and only the first is used.
    pub async fn fetch_order_by_order_id(&self, order_id: &str) -> Result<Option<Document<OrderRecord>>, CmsApiError> {
        debug!("Fetching order {order_id}");
        let result = self
            .rest_query::<ListResponse<OrderRecord>, ()>(
                Method::GET,
                "/orders",
                &[("filters[order_id][$eq]", order_id), ("populate", "*")],
                None,
            )
            .await?;
        Ok(result.data.into_iter().next())
    }

    pub async fn create_order(&self, order: NewOrderRecord) -> Result<Document<OrderRecord>, CmsApiError> {
        debug!("Creating order {}", order.order_id);
        let body = json!({ "data": order });
        let result = self.rest_query::<ItemResponse<OrderRecord>, Value>(Method::POST, "/orders", &[], Some(body)).await?;
        info!("Created order {}", order.order_id);
        Ok(result.data)
    }

    pub async fn update_order(&self, document_id: &str, update: OrderUpdateRecord) -> Result<(), CmsApiError> {
        debug!("Updating order {document_id} to status '{}'", update.order_status);
        let path = format!("/orders/{document_id}");
        let body = json!({ "data": update });
        // The response body is the updated record; nothing downstream needs it.
        let _ = self.rest_query::<Value, Value>(Method::PUT, &path, &[], Some(body)).await?;
        Ok(())
    }

    pub async fn fetch_product_by_ref(&self, product_ref: &str) -> Result<Option<Document<ProductRecord>>, CmsApiError> {
        debug!("Fetching product {product_ref}");
        let result = self
            .rest_query::<ListResponse<ProductRecord>, ()>(
                Method::GET,
                "/products",
                &[("filters[documentId][$eq]", product_ref)],
                None,
            )
            .await?;
        Ok(result.data.into_iter().next())
    }

    pub async fn set_product_stock(&self, document_id: &str, stock: i64) -> Result<(), CmsApiError> {
        debug!("Setting stock for product {document_id} to {stock}");
        let path = format!("/products/{document_id}");
        let body = json!({ "data": { "stock": stock } });
        let _ = self.rest_query::<Value, Value>(Method::PUT, &path, &[], Some(body)).await?;
        Ok(())
    }

    pub async fn fetch_cart_lines_for_user(&self, user_id: i64) -> Result<Vec<Document<CartRecord>>, CmsApiError> {
        debug!("Fetching cart lines for user #{user_id}");
        let user_id = user_id.to_string();
        let result = self
            .rest_query::<ListResponse<CartRecord>, ()>(
                Method::GET,
                "/user-carts",
                &[("filters[users_permissions_user][id][$eq]", user_id.as_str())],
                None,
            )
            .await?;
        Ok(result.data)
    }

    pub async fn delete_cart_line(&self, document_id: &str) -> Result<(), CmsApiError> {
        debug!("Deleting cart line {document_id}");
        let path = format!("/user-carts/{document_id}");
        let url = self.url(&path);
        // Deletes return 204 with an empty body, which the generic JSON query cannot represent.
        let response = self.client.delete(url).send().await.map_err(|e| CmsApiError::RestResponseError(e.to_string()))?;
        match response.status() {
            s if s.is_success() || s == StatusCode::NOT_FOUND => Ok(()),
            s => {
                let message = response.text().await.map_err(|e| CmsApiError::RestResponseError(e.to_string()))?;
                Err(CmsApiError::QueryError { status: s.as_u16(), message })
            },
        }
    }

    pub async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, CmsApiError> {
        debug!("Looking up user by email");
        let result = self
            .rest_query::<Vec<UserRecord>, ()>(Method::GET, "/users", &[("filters[email][$eq]", email)], None)
            .await?;
        Ok(result.into_iter().next())
    }
}
