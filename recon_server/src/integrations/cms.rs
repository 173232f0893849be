//! CMS-backed implementation of the engine's storefront traits.
//!
//! All shape normalisation happens in `cms_tools`; this module only converts the normalised records into the
//! engine's canonical types and maps client errors onto [`StoreError`].

use cms_tools::{CmsApi, CmsApiError, Document, ItemRecord, NewOrderRecord, OrderRecord, OrderUpdateRecord};
use recon_engine::{
    status::OrderStatus,
    traits::{CartStore, CustomerDirectory, OrderStore, ProductStore, StoreError},
    types::{CartLine, CustomerRef, DocumentId, LineItem, NewOrder, Order, OrderId, OrderUpdate, Product},
};
use spr_common::Money;

#[derive(Clone)]
pub struct CmsBackend {
    api: CmsApi,
}

impl CmsBackend {
    pub fn new(api: CmsApi) -> Self {
        Self { api }
    }
}

impl OrderStore for CmsBackend {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let doc = self.api.fetch_order_by_order_id(order_id.as_str()).await.map_err(store_error)?;
        doc.map(order_from_document).transpose()
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let record = new_order_record(order);
        let doc = self.api.create_order(record).await.map_err(store_error)?;
        order_from_document(doc)
    }

    async fn update_order(&self, id: &DocumentId, update: OrderUpdate) -> Result<(), StoreError> {
        let record = OrderUpdateRecord {
            order_status: update.status.to_string(),
            gateway_transaction_id: update.gateway_transaction_id,
            payment_data: update.payment_metadata,
        };
        self.api.update_order(id.as_str(), record).await.map_err(store_error)
    }
}

impl ProductStore for CmsBackend {
    async fn fetch_product(&self, product_ref: &str) -> Result<Option<Product>, StoreError> {
        let doc = match self.api.fetch_product_by_ref(product_ref).await.map_err(store_error)? {
            Some(doc) => doc,
            None => return Ok(None),
        };
        let internal_id = DocumentId(doc.internal_id().map_err(store_error)?);
        Ok(Some(Product {
            internal_id,
            product_ref: product_ref.to_string(),
            name: doc.record.name,
            stock: doc.record.stock,
        }))
    }

    async fn set_product_stock(&self, id: &DocumentId, stock: i64) -> Result<(), StoreError> {
        self.api.set_product_stock(id.as_str(), stock).await.map_err(store_error)
    }
}

impl CartStore for CmsBackend {
    async fn fetch_cart_lines(&self, customer_id: i64) -> Result<Vec<CartLine>, StoreError> {
        let docs = self.api.fetch_cart_lines_for_user(customer_id).await.map_err(store_error)?;
        docs.into_iter()
            .map(|doc| {
                let internal_id = DocumentId(doc.internal_id().map_err(store_error)?);
                Ok(CartLine { internal_id, quantity: doc.record.quantity })
            })
            .collect()
    }

    async fn delete_cart_line(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.api.delete_cart_line(id.as_str()).await.map_err(store_error)
    }
}

impl CustomerDirectory for CmsBackend {
    async fn fetch_customer_id_by_email(&self, email: &str) -> Result<Option<i64>, StoreError> {
        let user = self.api.fetch_user_by_email(email).await.map_err(store_error)?;
        Ok(user.map(|u| u.id))
    }
}

//--------------------------------------      Conversions       ------------------------------------------------------

fn store_error(e: CmsApiError) -> StoreError {
    match e {
        CmsApiError::QueryError { status, message } => StoreError::Backend { status, message },
        CmsApiError::JsonError(m) | CmsApiError::ShapeError(m) => StoreError::Malformed(m),
        CmsApiError::Initialization(m) | CmsApiError::RestResponseError(m) => StoreError::Network(m),
    }
}

fn order_from_document(doc: Document<OrderRecord>) -> Result<Order, StoreError> {
    let internal_id = DocumentId(doc.internal_id().map_err(store_error)?);
    let record = doc.record;
    let status: OrderStatus = record.order_status.unwrap_or_else(|| "pending".to_string()).into();
    let customer = CustomerRef {
        id: record.users_permissions_user.as_ref().and_then(|r| r.id()),
        email: record.customer_email,
    };
    Ok(Order {
        internal_id,
        order_id: record.order_id.into(),
        status,
        total_amount: Money::from_units(record.total_amount.unwrap_or_default()),
        items: record.items.into_iter().map(item_from_record).collect(),
        customer,
        gateway_transaction_id: record.gateway_transaction_id,
    })
}

fn item_from_record(item: ItemRecord) -> LineItem {
    LineItem {
        product_ref: item.id,
        name: item.name,
        unit_price: Money::from_units(item.price),
        quantity: item.quantity,
        category: item.category.unwrap_or_default(),
    }
}

fn record_from_item(item: LineItem) -> ItemRecord {
    ItemRecord {
        id: item.product_ref,
        name: item.name,
        price: item.unit_price.to_units(),
        quantity: item.quantity,
        category: if item.category.is_empty() { None } else { Some(item.category) },
    }
}

fn new_order_record(order: NewOrder) -> NewOrderRecord {
    NewOrderRecord {
        order_id: order.order_id.0,
        order_status: "pending".to_string(),
        total_amount: order.total_amount.to_units(),
        customer_name: order.customer.full_name(),
        customer_email: order.customer.email,
        customer_phone: order.customer.phone,
        shipping_address: order.customer.shipping_address,
        items: order.items.into_iter().map(record_from_item).collect(),
        users_permissions_user: order.customer_id,
        gateway_transaction_id: None,
        payment_data: serde_json::json!({ "created_at": order.created_at.to_rfc3339() }),
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn orders_normalise_into_the_engine_model() {
        let doc: Document<OrderRecord> = serde_json::from_value(json!({
            "documentId": "ord-9",
            "order_id": "ORDER-9",
            "order_status": "settlement",
            "total_amount": 262000.0,
            "customer_email": "ayu@example.com",
            "users_permissions_user": {"data": {"id": 7}},
            "items": [
                {"id": "doc-rice", "name": "Rice 5kg", "price": 131000.0, "quantity": 2, "category": "groceries"}
            ],
        }))
        .unwrap();
        let order = order_from_document(doc).unwrap();
        assert_eq!(order.internal_id.as_str(), "ord-9");
        assert_eq!(order.status, OrderStatus::Settlement);
        assert_eq!(order.total_amount, Money::from_units(262_000.0));
        assert_eq!(order.customer.id, Some(7));
        assert_eq!(order.items[0].product_ref, "doc-rice");
    }

    #[test]
    fn unknown_status_strings_fall_back_to_pending() {
        let doc: Document<OrderRecord> = serde_json::from_value(json!({
            "id": 3,
            "order_id": "ORDER-3",
            "order_status": "definitely-not-a-status",
        }))
        .unwrap();
        let order = order_from_document(doc).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.internal_id.as_str(), "3");
    }
}
